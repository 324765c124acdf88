//! Asynchronous twins of [`crate::walk`].
//!
//! Callbacks are awaited one at a time in exactly the order the synchronous
//! walk would call them; nothing runs concurrently.

use serde_json::Value;

use cma_types::Path;

use crate::node::{preorder, push_children, reassemble_filtered, reassemble_mapped, NodeEntry, NodeMatch};

pub async fn visit_nodes_async<F, E>(root: &Value, mut visitor: F) -> Result<(), E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<(), E>,
{
    for entry in preorder(root) {
        visitor(entry.node, entry.parent, &entry.path).await?;
    }
    Ok(())
}

pub async fn map_nodes_async<F, E>(root: &Value, mut mapper: F) -> Result<Value, E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<Value, E>,
{
    let mut mapped = Vec::new();
    for entry in preorder(root) {
        mapped.push(mapper(entry.node, entry.parent, &entry.path).await?);
    }
    Ok(reassemble_mapped(root, &mut mapped.into_iter()))
}

pub async fn filter_nodes_async<F, E>(root: &Value, mut predicate: F) -> Result<Option<Value>, E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    let mut decisions = Vec::new();
    let mut stack = vec![NodeEntry::root(root)];
    while let Some(entry) = stack.pop() {
        let keep = predicate(entry.node, entry.parent, &entry.path).await?;
        decisions.push(keep);
        if keep {
            push_children(&mut stack, &entry);
        }
    }
    Ok(reassemble_filtered(root, &mut decisions.into_iter()))
}

pub async fn find_node_async<'a, F, E>(
    root: &'a Value,
    mut predicate: F,
) -> Result<Option<NodeMatch<'a>>, E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    for entry in preorder(root) {
        if predicate(entry.node, entry.parent, &entry.path).await? {
            return Ok(Some(entry.into_match()));
        }
    }
    Ok(None)
}

pub async fn find_all_nodes_async<'a, F, E>(
    root: &'a Value,
    mut predicate: F,
) -> Result<Vec<NodeMatch<'a>>, E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    let mut found = Vec::new();
    for entry in preorder(root) {
        if predicate(entry.node, entry.parent, &entry.path).await? {
            found.push(entry.into_match());
        }
    }
    Ok(found)
}

pub async fn reduce_nodes_async<A, F, E>(root: &Value, init: A, mut reducer: F) -> Result<A, E>
where
    F: AsyncFnMut(A, &Value, Option<&Value>, &Path) -> Result<A, E>,
{
    let mut acc = init;
    for entry in preorder(root) {
        acc = reducer(acc, entry.node, entry.parent, &entry.path).await?;
    }
    Ok(acc)
}

pub async fn some_node_async<F, E>(root: &Value, mut predicate: F) -> Result<bool, E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    for entry in preorder(root) {
        if predicate(entry.node, entry.parent, &entry.path).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub async fn every_node_async<F, E>(root: &Value, mut predicate: F) -> Result<bool, E>
where
    F: AsyncFnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    for entry in preorder(root) {
        if !predicate(entry.node, entry.parent, &entry.path).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::node_type;
    use crate::walk;
    use proptest::prelude::*;
    use serde_json::json;
    use std::convert::Infallible;

    fn document() -> Value {
        json!({
            "type": "root",
            "children": [
                { "type": "paragraph", "children": [ { "type": "span", "value": "a" } ] },
                { "type": "block", "item": "b1" },
                { "type": "list", "children": [
                    { "type": "listItem", "children": [ { "type": "inlineBlock", "item": "b2" } ] }
                ] }
            ]
        })
    }

    #[tokio::test]
    async fn async_visit_matches_sync_order() {
        let doc = document();
        let mut sync_paths = Vec::new();
        walk::visit_nodes::<_, Infallible>(&doc, |_, _, path| {
            sync_paths.push(path.clone());
            Ok(())
        })
        .unwrap();

        let mut async_paths = Vec::new();
        visit_nodes_async::<_, Infallible>(&doc, async |_, _, path| {
            tokio::task::yield_now().await;
            async_paths.push(path.clone());
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(sync_paths, async_paths);
    }

    #[tokio::test]
    async fn async_map_and_filter() {
        let doc = document();
        let mapped = map_nodes_async::<_, Infallible>(&doc, async |node, _, _| Ok(node.clone()))
            .await
            .unwrap();
        assert_eq!(mapped, doc);

        let filtered = filter_nodes_async::<_, Infallible>(&doc, async |node, _, _| {
            Ok(node_type(node) != Some("list"))
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(filtered["children"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn async_find_and_reduce() {
        let doc = document();
        let found = find_all_nodes_async::<_, Infallible>(&doc, async |node, _, _| {
            Ok(node.get("item").is_some())
        })
        .await
        .unwrap();
        let paths: Vec<_> = found.iter().map(|m| m.path.to_string()).collect();
        assert_eq!(paths, vec!["children[1]", "children[2].children[0].children[0]"]);

        let first = find_node_async::<_, Infallible>(&doc, async |node, _, _| {
            Ok(node_type(node) == Some("inlineBlock"))
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(first.node["item"], "b2");

        let depth_sum = reduce_nodes_async::<_, _, Infallible>(&doc, 0usize, async |acc, _, _, path| {
            Ok(acc + path.len() / 2)
        })
        .await
        .unwrap();
        // depths: root 0, paragraph 1, span 2, block 1, list 1, listItem 2, inlineBlock 3
        assert_eq!(depth_sum, 10);
    }

    #[tokio::test]
    async fn async_some_every_and_abort() {
        let doc = document();
        assert!(some_node_async::<_, Infallible>(&doc, async |n, _, _| Ok(node_type(n) == Some("span")))
            .await
            .unwrap());
        assert!(!every_node_async::<_, Infallible>(&doc, async |n, _, _| Ok(n.get("item").is_none()))
            .await
            .unwrap());

        let mut calls = 0;
        let err = visit_nodes_async(&doc, async |_, _, _| {
            calls += 1;
            if calls == 2 { Err("stop") } else { Ok(()) }
        })
        .await
        .unwrap_err();
        assert_eq!(err, "stop");
        assert_eq!(calls, 2);
    }

    fn arb_tree() -> impl Strategy<Value = Value> {
        let leaf = "[a-z]{1,4}".prop_map(|t| json!({ "type": t }));
        leaf.prop_recursive(4, 32, 4, |inner| {
            ("[a-z]{1,4}", proptest::collection::vec(inner, 0..4))
                .prop_map(|(t, children)| json!({ "type": t, "children": children }))
        })
    }

    proptest! {
        #[test]
        fn visit_order_is_deterministic(tree in arb_tree()) {
            let collect = |root: &Value| {
                let mut out = Vec::new();
                walk::visit_nodes::<_, Infallible>(root, |node, _, path| {
                    out.push((path.clone(), node_type(node).map(str::to_string)));
                    Ok(())
                })
                .unwrap();
                out
            };
            prop_assert_eq!(collect(&tree), collect(&tree));
        }

        #[test]
        fn map_identity_is_lossless(tree in arb_tree()) {
            let out = walk::map_nodes::<_, Infallible>(&tree, |node, _, _| Ok(node.clone())).unwrap();
            prop_assert_eq!(out, tree);
        }
    }
}
