//! Semantic-ID service. A pure function of its inputs: no allocation-
//! visible side effects, ids round-trip through `parse_id(compute_id(...))`.

use codegraph_core::{CodeGraphError, NodeId, NodeType, Result};

const SEPARATOR: &str = "->";
const GLOBAL: &str = "global";

/// Fixed, at-most-one-per-graph singleton node ids. These sit outside
/// the `<file>-><scope>-><TYPE>-><name>` scheme entirely.
pub const NET_REQUEST_SINGLETON_ID: &str = "singleton::net_request";
pub const STDIO_SINGLETON_ID: &str = "singleton::stdio";

/// The live scope context threaded through every visitor.
/// Constructing an id requires only this plus the kind/name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeContext {
    pub file: String,
    pub scope_path: Vec<String>,
}

impl ScopeContext {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            scope_path: Vec::new(),
        }
    }

    pub fn with_scope(file: impl Into<String>, scope_path: Vec<String>) -> Self {
        Self {
            file: file.into(),
            scope_path,
        }
    }

    /// A new context with one more scope frame pushed on the end.
    pub fn push(&self, scope_name: impl Into<String>) -> Self {
        let mut scope_path = self.scope_path.clone();
        scope_path.push(scope_name.into());
        Self {
            file: self.file.clone(),
            scope_path,
        }
    }

}

/// Disambiguates two entities of the same kind sharing scope + name.
pub enum Disambiguator {
    Discriminator(String),
    InlineContext(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub file: String,
    pub scope_path: Vec<String>,
    pub node_type: NodeType,
    pub name: String,
    pub discriminator: Option<String>,
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.contains(SEPARATOR) {
        return Err(CodeGraphError::InvalidOperation(format!(
            "identifier segment {segment:?} contains the reserved separator {SEPARATOR:?}"
        )));
    }
    Ok(())
}

fn scope_segment(ctx: &ScopeContext) -> Result<String> {
    if ctx.scope_path.is_empty() {
        return Ok(GLOBAL.to_string());
    }
    for s in &ctx.scope_path {
        validate_segment(s)?;
    }
    Ok(ctx.scope_path.join(SEPARATOR))
}

/// `compute_id(type, name, context) -> string`.
pub fn compute_id(node_type: &NodeType, name: &str, ctx: &ScopeContext) -> Result<NodeId> {
    validate_segment(&ctx.file)?;
    validate_segment(name)?;
    let scope = scope_segment(ctx)?;
    Ok(format!(
        "{}{SEPARATOR}{scope}{SEPARATOR}{node_type}{SEPARATOR}{name}",
        ctx.file
    ))
}

/// `compute_id_with(type, name, context, { discriminator | inline_context }) -> string`.
pub fn compute_id_with(
    node_type: &NodeType,
    name: &str,
    ctx: &ScopeContext,
    disambiguator: Disambiguator,
) -> Result<NodeId> {
    let base = compute_id(node_type, name, ctx)?;
    Ok(match disambiguator {
        Disambiguator::Discriminator(d) => format!("{base}#{d}"),
        Disambiguator::InlineContext(c) => format!("{base}[{c}]"),
    })
}

/// `parse_id(id) -> { file, scope_path, type, name, discriminator? }?`.
///
/// Returns `None` when `id` does not have the minimum `<file>-><scope>-><TYPE>-><name>`
/// shape (e.g. a singleton id, which lives outside this scheme).
pub fn parse_id(id: &str) -> Option<ParsedId> {
    let (core, discriminator) = split_suffix(id);
    let parts: Vec<&str> = core.split(SEPARATOR).collect();
    if parts.len() < 4 {
        return None;
    }
    let name = parts[parts.len() - 1].to_string();
    let type_tag = parts[parts.len() - 2];
    let node_type = type_tag.parse::<NodeType>().ok()?;
    let scope_parts = &parts[1..parts.len() - 2];
    let scope_path = if scope_parts == [GLOBAL] {
        Vec::new()
    } else {
        scope_parts.iter().map(|s| s.to_string()).collect()
    };
    let file = parts[0].to_string();
    Some(ParsedId {
        file,
        scope_path,
        node_type,
        name,
        discriminator,
    })
}

/// Splits a trailing `#<discriminator>` or `[<context>]` suffix off the name
/// component, returning the core id (unsuffixed) and the discriminator text
/// if one was present. Both forms are folded into `discriminator` on parse —
/// the distinction between a disambiguating discriminator and an inline
/// context is not recoverable from the string alone, only from call-site
/// intent, so `parse_id` treats them uniformly.
fn split_suffix(id: &str) -> (&str, Option<String>) {
    if let Some(hash_idx) = id.rfind('#') {
        // Only treat as a discriminator if it trails the last separator's name
        // component, not some earlier path segment.
        if !id[hash_idx..].contains(SEPARATOR) {
            return (&id[..hash_idx], Some(id[hash_idx + 1..].to_string()));
        }
    }
    if let Some(bracket_idx) = id.rfind('[') {
        if id.ends_with(']') && !id[bracket_idx..].contains(SEPARATOR) {
            return (
                &id[..bracket_idx],
                Some(id[bracket_idx + 1..id.len() - 1].to_string()),
            );
        }
    }
    (id, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_becomes_global() {
        let ctx = ScopeContext::new("demo.js");
        let id = compute_id(&NodeType::Class, "SocketService", &ctx).unwrap();
        assert_eq!(id, "demo.js->global->CLASS->SocketService");
    }

    #[test]
    fn nested_scope_joins_with_arrow() {
        let ctx = ScopeContext::with_scope("a.js", vec!["outer".into(), "inner".into()]);
        let id = compute_id(&NodeType::Variable, "x", &ctx).unwrap();
        assert_eq!(id, "a.js->outer->inner->VARIABLE->x");
    }

    #[test]
    fn round_trips_through_parse() {
        let ctx = ScopeContext::with_scope("a.ts", vec!["Foo".into()]);
        let id = compute_id(&NodeType::Function, "bar", &ctx).unwrap();
        let parsed = parse_id(&id).unwrap();
        assert_eq!(parsed.file, "a.ts");
        assert_eq!(parsed.scope_path, vec!["Foo".to_string()]);
        assert_eq!(parsed.node_type, NodeType::Function);
        assert_eq!(parsed.name, "bar");
        assert_eq!(parsed.discriminator, None);
    }

    #[test]
    fn discriminator_round_trips() {
        let ctx = ScopeContext::new("a.ts");
        let id = compute_id_with(
            &NodeType::Variable,
            "x",
            &ctx,
            Disambiguator::Discriminator("2".into()),
        )
        .unwrap();
        assert_eq!(id, "a.ts->global->VARIABLE->x#2");
        let parsed = parse_id(&id).unwrap();
        assert_eq!(parsed.name, "x");
        assert_eq!(parsed.discriminator, Some("2".into()));
    }

    #[test]
    fn name_containing_separator_is_rejected() {
        let ctx = ScopeContext::new("a.ts");
        let err = compute_id(&NodeType::Variable, "weird->name", &ctx);
        assert!(err.is_err());
    }

    #[test]
    fn unrelated_root_does_not_change_existing_ids() {
        let ctx_a = ScopeContext::new("backend/src/api.js");
        let id_before = compute_id(&NodeType::Function, "getUser", &ctx_a).unwrap();
        // adding another root is purely additive from this module's perspective;
        // its own context never references the new root's basename.
        let ctx_a_again = ScopeContext::new("backend/src/api.js");
        let id_after = compute_id(&NodeType::Function, "getUser", &ctx_a_again).unwrap();
        assert_eq!(id_before, id_after);
    }

    #[test]
    fn singleton_ids_are_fixed_literals_outside_the_scheme() {
        assert!(parse_id(NET_REQUEST_SINGLETON_ID).is_none());
        assert!(parse_id(STDIO_SINGLETON_ID).is_none());
    }
}
