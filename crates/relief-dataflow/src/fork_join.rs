//! The `Fork-join` (1→1) primitive: wraps a `Split`, two independent
//! sub-pipelines, and a `Merge`, re-merging results in order.

use crate::channel::Source;
use crate::merge::merge;
use crate::split::split;

/// `split_fn` divides each input into a left and right branch; `left_pipe`
/// and `right_pipe` build whatever sub-graph of blocks each branch needs
/// (they are called once, at wiring time, with the branch's raw source);
/// `merge_fn` recombines the two branches' outputs positionally.
pub fn fork_join<In, L, R, L2, R2, Out, SplitF, LeftPipe, RightPipe, MergeF>(
    input: Source<In>,
    capacity: usize,
    split_fn: SplitF,
    left_pipe: LeftPipe,
    right_pipe: RightPipe,
    merge_fn: MergeF,
) -> Source<Out>
where
    In: Send + 'static,
    L: Send + 'static,
    R: Send + 'static,
    L2: Send + 'static,
    R2: Send + 'static,
    Out: Send + 'static,
    SplitF: Fn(In) -> (L, R) + Send + 'static,
    LeftPipe: FnOnce(Source<L>) -> Source<L2>,
    RightPipe: FnOnce(Source<R>) -> Source<R2>,
    MergeF: Fn(L2, R2) -> Out + Send + 'static,
{
    let (left_source, right_source) = split(input, capacity, split_fn);
    let left_out = left_pipe(left_source);
    let right_out = right_pipe(right_source);
    merge(left_out, right_out, capacity, merge_fn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::link;
    use crate::transform::transform_infallible;

    #[tokio::test]
    async fn metadata_branch_and_work_branch_recombine_in_order() {
        let (target, source) = link::<u32>(4);
        for i in 0..4u32 {
            target.send(i).await.unwrap();
        }
        target.complete();

        let mut out = fork_join(
            source,
            4,
            |n| (n, n),
            |left| left, // metadata branch: pass through untouched
            |right| transform_infallible(right, 4, 2, |n| async move { n * n }),
            |meta, squared| (meta, squared),
        );

        let mut collected = Vec::new();
        while let Some(Ok(v)) = out.recv().await {
            collected.push(v);
        }
        assert_eq!(collected, vec![(0, 0), (1, 1), (2, 4), (3, 9)]);
    }
}
