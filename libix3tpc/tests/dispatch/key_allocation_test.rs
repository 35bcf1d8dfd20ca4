#[path = "../common/mod.rs"]
mod common;

use libix3tpc::{CommandKey, ControllerConfig, Error};
use proptest::prelude::*;

#[test]
fn keys_are_lowest_free() {
    let (_mock, d) = common::mock_dispatcher(&ControllerConfig::new());
    let keys: Vec<_> = (0..3).map(|_| d.send("OPE?", None, 1000).unwrap()).collect();
    assert_eq!(keys, vec![CommandKey::new(0), CommandKey::new(1), CommandKey::new(2)]);
    assert_eq!(d.table().len(), 3);
}

#[test]
fn retired_key_is_reused() -> anyhow::Result<()> {
    let (mock, d) = common::mock_dispatcher(&ControllerConfig::new());
    mock.script("OPE?", libix3tpc::transport::mock::Reply::Hold);
    let first = d.send("OPE?", None, 1000)?;
    let second = d.send("OPE?", None, 1000)?;
    assert_eq!((first.as_usize(), second.as_usize()), (0, 1));

    // Both held; answering them frees keys 0 and 1.
    mock.release_held("OPE 0");
    mock.wait_idle();
    assert!(d.table().is_empty());
    assert_eq!(d.send("OPE?", None, 1000)?, CommandKey::new(0));
    Ok(())
}

#[test]
fn key_limit_exhausts() {
    let config = ControllerConfig::new().with_key_limit(2);
    let (mock, d) = common::mock_dispatcher(&config);
    d.send("A", None, 1000).unwrap();
    d.send("B", None, 1000).unwrap();
    assert!(matches!(d.send("C", None, 1000), Err(Error::ResourceExhausted)));
    assert_eq!(mock.sent_commands(), vec!["A", "B"]);
}

#[test]
fn concurrent_senders_get_distinct_keys() {
    let (mock, d) = common::mock_dispatcher(&ControllerConfig::new());
    let mut keys: Vec<usize> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (0..50)
                        .map(|_| d.send("DSH?", None, 1000).unwrap().as_usize())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect()
    });
    keys.sort_unstable();
    assert_eq!(keys, (0..400).collect::<Vec<_>>());
    assert_eq!(d.table().len(), 400);
    assert_eq!(mock.sent_records().len(), 400);
}

proptest! {
    #[test]
    fn outstanding_keys_are_distinct(n in 1usize..24) {
        let (_mock, d) = common::mock_dispatcher(&ControllerConfig::new());
        let mut keys: Vec<usize> = (0..n)
            .map(|_| d.send("DSH?", None, 1000).unwrap().as_usize())
            .collect();
        prop_assert_eq!(d.table().len(), n);
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys, (0..n).collect::<Vec<_>>());
    }
}
