//! Node factory: one constructor per node kind. This is the *only*
//! place in the workspace that mints a node id — every other crate calls
//! through here instead of calling `codegraph_ids::compute_id` directly.

use codegraph_core::{FrameworkTag, Location, Metadata, NodeRecord, NodeType, Result};
use codegraph_ids::{compute_id, compute_id_with, parse_id, Disambiguator, ScopeContext};

fn base(node_type: NodeType, ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    let id = compute_id(&node_type, name, ctx)?;
    Ok(NodeRecord {
        id,
        node_type,
        name: name.to_string(),
        file: ctx.file.clone(),
        location,
        metadata: Metadata::default(),
    })
}

fn disambiguated(
    node_type: NodeType,
    ctx: &ScopeContext,
    name: &str,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    let id = match discriminator {
        Some(d) => compute_id_with(
            &node_type,
            name,
            ctx,
            Disambiguator::Discriminator(d.to_string()),
        )?,
        None => compute_id(&node_type, name, ctx)?,
    };
    Ok(NodeRecord {
        id,
        node_type,
        name: name.to_string(),
        file: ctx.file.clone(),
        location,
        metadata: Metadata::default(),
    })
}

pub fn create_module(ctx: &ScopeContext, location: Location) -> Result<NodeRecord> {
    let name = ctx.file.clone();
    base(NodeType::Module, ctx, &name, location)
}

pub fn create_function(
    ctx: &ScopeContext,
    name: &str,
    location: Location,
    is_async: bool,
    is_generator: bool,
) -> Result<NodeRecord> {
    let mut record = base(NodeType::Function, ctx, name, location)?;
    record.metadata = Metadata::default()
        .with("is_async", is_async)
        .with("is_generator", is_generator);
    Ok(record)
}

/// `superclass`/`implements` land in metadata; EXTENDS/IMPLEMENTS edges are
/// the builder's job, not the factory's.
pub fn create_class(
    ctx: &ScopeContext,
    name: &str,
    location: Location,
    superclass: Option<&str>,
    implements: &[String],
) -> Result<NodeRecord> {
    let mut record = base(NodeType::Class, ctx, name, location)?;
    let mut metadata = Metadata::default();
    if let Some(sc) = superclass {
        metadata = metadata.with("superclass", sc);
    }
    if !implements.is_empty() {
        metadata = metadata.with("implements", implements.join(","));
    }
    record.metadata = metadata;
    Ok(record)
}

pub fn create_variable(
    ctx: &ScopeContext,
    name: &str,
    location: Location,
    is_class_property: bool,
) -> Result<NodeRecord> {
    let mut record = base(NodeType::Variable, ctx, name, location)?;
    record.metadata = Metadata::default().with("is_class_property", is_class_property);
    Ok(record)
}

pub fn create_constant(ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Constant, ctx, name, location)
}

pub fn create_parameter(
    ctx: &ScopeContext,
    name: &str,
    location: Location,
    function_name: &str,
) -> Result<NodeRecord> {
    let mut record = base(NodeType::Parameter, ctx, name, location)?;
    record.metadata = Metadata::default().with("function_name", function_name);
    Ok(record)
}

pub fn create_call(ctx: &ScopeContext, callee_name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Call, ctx, callee_name, location)
}

pub fn create_method_call(
    ctx: &ScopeContext,
    object_name: &str,
    method_name: &str,
    location: Location,
) -> Result<NodeRecord> {
    let name = format!("{object_name}.{method_name}");
    let mut record = base(NodeType::MethodCall, ctx, &name, location)?;
    record.metadata = Metadata::default()
        .with("object", object_name)
        .with("method", method_name);
    Ok(record)
}

pub fn create_literal(
    ctx: &ScopeContext,
    text: &str,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Literal, ctx, text, location, discriminator)
}

pub fn create_array_literal(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::ArrayLiteral, ctx, "array", location, discriminator)
}

pub fn create_object_literal(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(
        NodeType::ObjectLiteral,
        ctx,
        "object",
        location,
        discriminator,
    )
}

/// Synthetic node for a complex RHS expression (binary/conditional/unary/
/// template/logical) that the builder wires DERIVES_FROM edges out of.
pub fn create_expression(
    ctx: &ScopeContext,
    kind_label: &str,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Expression, ctx, kind_label, location, discriminator)
}

pub fn create_import(
    ctx: &ScopeContext,
    specifier_name: &str,
    location: Location,
    source: &str,
) -> Result<NodeRecord> {
    let mut record = base(NodeType::Import, ctx, specifier_name, location)?;
    record.metadata = Metadata::default().with("source", source);
    Ok(record)
}

pub fn create_export(ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Export, ctx, name, location)
}

pub fn create_scope(
    ctx: &ScopeContext,
    name: &str,
    location: Location,
) -> Result<NodeRecord> {
    base(NodeType::Scope, ctx, name, location)
}

pub fn create_loop(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Loop, ctx, "loop", location, discriminator)
}

pub fn create_branch(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Branch, ctx, "branch", location, discriminator)
}

pub fn create_case(
    ctx: &ScopeContext,
    label: &str,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Case, ctx, label, location, discriminator)
}

pub fn create_try(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Try, ctx, "try", location, discriminator)
}

pub fn create_catch(
    ctx: &ScopeContext,
    param_name: Option<&str>,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    let mut record = disambiguated(NodeType::Catch, ctx, "catch", location, discriminator)?;
    if let Some(p) = param_name {
        record.metadata = Metadata::default().with("param", p);
    }
    Ok(record)
}

pub fn create_finally(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::Finally, ctx, "finally", location, discriminator)
}

pub fn create_interface(ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Interface, ctx, name, location)
}

pub fn create_type(ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Type, ctx, name, location)
}

pub fn create_enum(ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Enum, ctx, name, location)
}

pub fn create_decorator(ctx: &ScopeContext, name: &str, location: Location) -> Result<NodeRecord> {
    base(NodeType::Decorator, ctx, name, location)
}

pub fn create_type_parameter(
    ctx: &ScopeContext,
    name: &str,
    location: Location,
    owner: &str,
) -> Result<NodeRecord> {
    let mut record = base(NodeType::TypeParameter, ctx, name, location)?;
    record.metadata = Metadata::default().with("owner", owner);
    Ok(record)
}

pub fn create_event_listener(
    ctx: &ScopeContext,
    event_name: &str,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::EventListener, ctx, event_name, location, discriminator)
}

pub fn create_http_request(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::HttpRequest, ctx, "http_request", location, discriminator)
}

pub fn create_fs_operation(
    ctx: &ScopeContext,
    op_name: &str,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::FsOperation, ctx, op_name, location, discriminator)
}

pub fn create_db_query(
    ctx: &ScopeContext,
    location: Location,
    discriminator: Option<&str>,
) -> Result<NodeRecord> {
    disambiguated(NodeType::DbQuery, ctx, "query", location, discriminator)
}

pub fn create_update_expression(
    ctx: &ScopeContext,
    target_name: &str,
    location: Location,
    operator: &str,
) -> Result<NodeRecord> {
    let mut record = base(NodeType::UpdateExpression, ctx, target_name, location)?;
    record.metadata = Metadata::default().with("operator", operator);
    Ok(record)
}

pub fn create_framework_node(
    ctx: &ScopeContext,
    tag: FrameworkTag,
    name: &str,
    location: Location,
) -> Result<NodeRecord> {
    base(NodeType::Framework(tag), ctx, name, location)
}

/// Singleton constructors take no arguments and calling them twice returns
/// deeply equal records.
pub fn create_net_request_singleton() -> NodeRecord {
    NodeRecord {
        id: codegraph_ids::NET_REQUEST_SINGLETON_ID.to_string(),
        node_type: NodeType::NetRequest,
        name: "network".to_string(),
        file: String::new(),
        location: Location::default(),
        metadata: Metadata::default(),
    }
}

pub fn create_stdio_singleton() -> NodeRecord {
    NodeRecord {
        id: codegraph_ids::STDIO_SINGLETON_ID.to_string(),
        node_type: NodeType::NetStdio,
        name: "stdio".to_string(),
        file: String::new(),
        location: Location::default(),
        metadata: Metadata::default(),
    }
}

/// Returns `[]` on success; otherwise the specific violations found, so the
/// storage facade can refuse a write in strict mode.
pub fn validate(record: &NodeRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if record.name.is_empty() {
        errors.push("missing required field: name".to_string());
    }

    let is_singleton = record.id == codegraph_ids::NET_REQUEST_SINGLETON_ID
        || record.id == codegraph_ids::STDIO_SINGLETON_ID;

    if is_singleton {
        let expected_type = if record.id == codegraph_ids::NET_REQUEST_SINGLETON_ID {
            NodeType::NetRequest
        } else {
            NodeType::NetStdio
        };
        if record.node_type != expected_type {
            errors.push(format!(
                "singleton id {} mismatched with node type {}",
                record.id, record.node_type
            ));
        }
        return errors;
    }

    if record.file.is_empty() {
        errors.push("missing required field: file".to_string());
    }

    match parse_id(&record.id) {
        None => errors.push(format!("malformed id: {}", record.id)),
        Some(parsed) => {
            if parsed.node_type != record.node_type {
                errors.push(format!(
                    "id type tag {} does not match record type {}",
                    parsed.node_type, record.node_type
                ));
            }
            if parsed.name != record.name {
                errors.push(format!(
                    "id name {:?} does not match record name {:?}",
                    parsed.name, record.name
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_instance_round_trip_validates() {
        let ctx = ScopeContext::new("demo.js");
        let record = create_class(&ctx, "SocketService", Location::default(), None, &[]).unwrap();
        assert_eq!(record.id, "demo.js->global->CLASS->SocketService");
        assert!(validate(&record).is_empty());
    }

    #[test]
    fn singletons_are_deeply_equal_across_calls() {
        let a = create_net_request_singleton();
        let b = create_net_request_singleton();
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert!(validate(&a).is_empty());
    }

    #[test]
    fn validator_flags_empty_name() {
        let ctx = ScopeContext::new("a.js");
        let mut record = create_variable(&ctx, "x", Location::default(), false).unwrap();
        record.name = String::new();
        let errors = validate(&record);
        assert!(errors.iter().any(|e| e.contains("name")));
    }
}
