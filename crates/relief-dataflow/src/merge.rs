//! The `Merge` (2→1) primitive, dual of `Split`: consumes one item from each
//! input atomically (never just one) and combines them. If either side is
//! momentarily empty, the whole block waits — it never emits a partial
//! pair.

use crate::channel::{link, Source};

pub fn merge<L, R, Out, G>(mut left: Source<L>, mut right: Source<R>, capacity: usize, g: G) -> Source<Out>
where
    L: Send + 'static,
    R: Send + 'static,
    Out: Send + 'static,
    G: Fn(L, R) -> Out + Send + 'static,
{
    let (target, source) = link(capacity);

    tokio::spawn(async move {
        loop {
            let (l, r) = tokio::join!(left.recv(), right.recv());
            match (l, r) {
                (Some(Ok(l)), Some(Ok(r))) => {
                    if target.send(g(l, r)).await.is_err() {
                        return;
                    }
                }
                (Some(Err(fault)), _) | (_, Some(Err(fault))) => {
                    target.fault(fault);
                    return;
                }
                // Either side ended (or both did): pairing cannot continue.
                _ => break,
            }
        }
        target.complete();
    });

    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::link as link_pair;

    #[tokio::test]
    async fn pairs_items_positionally() {
        let (lt, ls) = link_pair::<u32>(4);
        let (rt, rs) = link_pair::<&'static str>(4);

        for i in 0..3u32 {
            lt.send(i).await.unwrap();
        }
        lt.complete();
        for s in ["a", "b", "c"] {
            rt.send(s).await.unwrap();
        }
        rt.complete();

        let mut out = merge(ls, rs, 4, |n, s| format!("{n}{s}"));
        let mut collected = Vec::new();
        while let Some(Ok(v)) = out.recv().await {
            collected.push(v);
        }
        assert_eq!(collected, vec!["0a", "1b", "2c"]);
    }

    #[tokio::test]
    async fn completes_when_either_side_ends() {
        let (lt, ls) = link_pair::<u32>(4);
        let (rt, rs) = link_pair::<u32>(4);
        lt.send(1).await.unwrap();
        lt.complete();
        rt.complete(); // right never sends anything

        let mut out = merge(ls, rs, 4, |a, b| a + b);
        assert!(out.recv().await.is_none());
    }
}
