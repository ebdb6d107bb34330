//! Stack, scope, and variable translation
//!
//! Pure mapping between the engine's call-frame/scope/property shapes and
//! the client protocol's frame/scope/variable shapes. Engine positions are
//! 0-based, client positions 1-based; conversion happens here and nowhere
//! else.

use crate::cdp::{CallFrame, PropertyDescriptor, RemoteObject};
use crate::constants::{
    frame_names, scope_types, ACCESSOR_VALUE_PLACEHOLDER, EXCEPTION_VARIABLE_NAME,
    THIS_VARIABLE_NAME,
};
use crate::dap::{Scope, Source, StackFrame, Variable};
use crate::format::ValueFormatter;
use crate::handles::{HandleTable, ObjectHandle};
use crate::scripts::ScriptRegistry;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

// ============================================================
// POSITION CONVERSION
// ============================================================

pub fn to_engine_line(line: u32) -> u32 {
    line.saturating_sub(1)
}

pub fn to_engine_column(column: Option<u32>) -> u32 {
    column.map(|c| c.saturating_sub(1)).unwrap_or(0)
}

pub fn to_client_line(line: u32) -> u32 {
    line + 1
}

pub fn to_client_column(column: Option<u32>) -> u32 {
    column.map(|c| c + 1).unwrap_or(0)
}

// ============================================================
// SOURCE REFERENCES
// ============================================================

/// Encode a script id as a client source reference. The encoding is exact:
/// `source_reference_to_script_id(script_id_to_source_reference(id)) == id`
/// for every numeric engine script id.
pub fn script_id_to_source_reference(script_id: &str) -> Option<i64> {
    script_id.parse().ok().filter(|r| *r > 0)
}

/// Invert a source reference back to the engine script id
pub fn source_reference_to_script_id(source_reference: i64) -> String {
    source_reference.to_string()
}

// ============================================================
// STACK TRACES
// ============================================================

/// Map the paused stack to client frames, truncated to `levels` when given.
///
/// A failure while symbolizing a single frame degrades that entry to a
/// placeholder "Unknown" frame; it never fails the whole trace.
pub fn stack_trace(
    registry: &ScriptRegistry,
    frames: &[CallFrame],
    levels: Option<usize>,
) -> Vec<StackFrame> {
    let count = levels.unwrap_or(frames.len()).min(frames.len());
    frames[..count]
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            frame_to_client(registry, index as i64, frame).unwrap_or_else(|| {
                warn!(
                    "Failed to symbolize frame {} (script {})",
                    index, frame.location.script_id
                );
                StackFrame {
                    id: index as i64,
                    name: frame_names::UNKNOWN.to_string(),
                    source: None,
                    line: to_client_line(frame.location.line_number),
                    column: to_client_column(frame.location.column_number),
                }
            })
        })
        .collect()
}

fn frame_to_client(
    registry: &ScriptRegistry,
    id: i64,
    frame: &CallFrame,
) -> Option<StackFrame> {
    let script_id = &frame.location.script_id;
    let script = registry.lookup_by_id(script_id);

    let (source, has_real_url) = match script {
        Some(script) if !registry.should_ignore(script) => {
            let reference = script_id_to_source_reference(&script.id)?;
            (
                Some(Source::from_path(&script.url).with_source_reference(reference)),
                !script.has_placeholder_url(),
            )
        }
        // Missing or ignored: placeholder source naming the raw engine
        // script id, kept out of user-facing source flows.
        _ => (
            Some(Source::from_name(format!("<script {}>", script_id))),
            false,
        ),
    };

    let name = if frame.function_name.is_empty() {
        if has_real_url {
            frame_names::ANONYMOUS.to_string()
        } else {
            frame_names::EVAL.to_string()
        }
    } else {
        frame.function_name.clone()
    };

    Some(StackFrame {
        id,
        name,
        source,
        line: to_client_line(frame.location.line_number),
        column: to_client_column(frame.location.column_number),
    })
}

// ============================================================
// SCOPES
// ============================================================

/// Map one frame's scope chain to client scopes, allocating a handle per
/// scope. The first scope in the chain carries the frame's `this` binding
/// inside its handle entry.
pub fn scopes(handles: &mut HandleTable, frame: &CallFrame) -> Vec<Scope> {
    frame
        .scope_chain
        .iter()
        .enumerate()
        .map(|(index, scope)| {
            let reference = match &scope.object.object_id {
                Some(object_id) => {
                    let this_object = (index == 0).then(|| frame.this.clone()).flatten();
                    handles.create(ObjectHandle::new(object_id.clone()).with_this(this_object))
                }
                None => 0,
            };
            Scope {
                name: capitalize(&scope.scope_type),
                variables_reference: reference,
                expensive: scope.scope_type == scope_types::GLOBAL,
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================
// VARIABLES
// ============================================================

/// Merge the two property enumeration passes by name. Entries from the
/// second pass win on duplicate names.
pub fn merge_properties(
    first: Vec<PropertyDescriptor>,
    second: Vec<PropertyDescriptor>,
) -> Vec<PropertyDescriptor> {
    let mut by_name: HashMap<String, PropertyDescriptor> = HashMap::new();
    for prop in first.into_iter().chain(second) {
        by_name.insert(prop.name.clone(), prop);
    }
    by_name.into_values().collect()
}

/// Shared comparison rule for variable ordering: case-insensitive by name,
/// case-sensitive tiebreak.
pub fn compare_variable_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Convert one property descriptor to a client variable, allocating a child
/// handle when the value is expandable. Accessor-backed properties get a
/// placeholder value and no child handle - they must not be evaluated
/// automatically.
pub fn property_to_variable(
    handles: &mut HandleTable,
    formatter: &dyn ValueFormatter,
    prop: &PropertyDescriptor,
) -> Variable {
    if prop.is_accessor() {
        return Variable::new(prop.name.clone(), ACCESSOR_VALUE_PLACEHOLDER, 0);
    }

    match &prop.value {
        Some(value) => {
            let rendered = formatter.render(value);
            let reference = rendered
                .reference
                .map(|object_id| handles.create(ObjectHandle::new(object_id)))
                .unwrap_or(0);
            Variable::new(prop.name.clone(), rendered.display, reference)
        }
        None => Variable::new(prop.name.clone(), "undefined", 0),
    }
}

/// Convert a merged descriptor set to sorted client variables, prepending a
/// synthetic `this` entry (not subject to the sort) when the handle carried
/// a `this` binding.
pub fn variables_from_properties(
    handles: &mut HandleTable,
    formatter: &dyn ValueFormatter,
    properties: Vec<PropertyDescriptor>,
    this_object: Option<&RemoteObject>,
) -> Vec<Variable> {
    let mut variables: Vec<Variable> = properties
        .iter()
        .map(|prop| property_to_variable(handles, formatter, prop))
        .collect();
    variables.sort_by(|a, b| compare_variable_names(&a.name, &b.name));

    if let Some(this) = this_object {
        let rendered = formatter.render(this);
        let reference = rendered
            .reference
            .map(|object_id| handles.create(ObjectHandle::new(object_id)))
            .unwrap_or(0);
        variables.insert(
            0,
            Variable::new(THIS_VARIABLE_NAME, rendered.display, reference),
        );
    }

    variables
}

/// Synthesize the single pseudo-variable for the reserved exception handle
pub fn exception_variable(
    handles: &mut HandleTable,
    formatter: &dyn ValueFormatter,
    value: &RemoteObject,
) -> Variable {
    let rendered = formatter.render(value);
    let reference = rendered
        .reference
        .map(|object_id| handles.create(ObjectHandle::new(object_id)))
        .unwrap_or(0);
    Variable::new(EXCEPTION_VARIABLE_NAME, rendered.display, reference)
}
