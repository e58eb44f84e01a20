use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use quiver_core::algorithm::{CancelNotice, LifecycleEvent};
use quiver_core::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Directed grid with right and down edges
fn grid(side: usize) -> AdjacencyGraph {
    let mut pairs = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let v = row * side + col;
            if col + 1 < side {
                pairs.push((v, v + 1));
            }
            if row + 1 < side {
                pairs.push((v, v + side));
            }
        }
    }
    AdjacencyGraph::from_edges(side * side, &pairs).unwrap()
}

#[test]
fn test_abort_from_another_thread() {
    init_logger();
    let graph = grid(30);
    let mut dijkstra = DijkstraShortestPath::new(&graph, |_| 1.0);
    let handle = dijkstra.abort_handle();

    let (signal, started) = mpsc::channel();
    let aborter = {
        let handle = handle.clone();
        thread::spawn(move || {
            if started.recv().is_ok() {
                handle.abort();
            }
        })
    };

    // Block inside the first edge examination until the abort lands.
    let fired = Rc::new(Cell::new(false));
    let waiting = handle.clone();
    let flag = Rc::clone(&fired);
    let _wait = dijkstra.search_events().subscribe(move |event| {
        if event.kind() != EventKind::ExamineEdge || flag.replace(true) {
            return;
        }
        let _ = signal.send(());
        while !waiting.is_cancelling() {
            thread::yield_now();
        }
    });

    dijkstra.compute_from(VertexId(0)).unwrap();
    aborter.join().unwrap();

    assert_eq!(dijkstra.state(), ComputationState::Aborted);
    assert!(fired.get());
    // Partial results stay readable but incomplete.
    assert!(dijkstra.distance(VertexId(graph.vertex_count() - 1)).is_none());

    dijkstra.compute_from(VertexId(0)).unwrap();
    assert_eq!(dijkstra.state(), ComputationState::Finished);
    assert!(!handle.is_cancelling());
    assert_eq!(dijkstra.distance(VertexId(graph.vertex_count() - 1)), Some(58.0));
}

#[test]
fn test_abort_outside_a_run_is_ignored() {
    init_logger();
    let graph = grid(3);
    let mut bfs = BreadthFirstSearch::new(&graph);

    bfs.abort();
    assert_eq!(bfs.state(), ComputationState::NotRunning);
    assert!(!bfs.is_cancelling());

    bfs.compute_from(VertexId(0)).unwrap();
    assert_eq!(bfs.state(), ComputationState::Finished);
}

#[test]
fn test_lifecycle_notifications() {
    init_logger();
    let graph = grid(2);
    let mut dfs = DepthFirstSearch::new(&graph);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _l = dfs
        .core()
        .on_lifecycle(move |event| sink.lock().unwrap().push(*event));

    dfs.compute().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            LifecycleEvent::StateChanged {
                from: ComputationState::NotRunning,
                to: ComputationState::Running,
            },
            LifecycleEvent::Started,
            LifecycleEvent::StateChanged {
                from: ComputationState::Running,
                to: ComputationState::Finished,
            },
            LifecycleEvent::Finished,
        ]
    );
}

#[test]
fn test_concurrent_begin_is_rejected() {
    init_logger();
    let core = AlgorithmCore::new();
    let guard = core.begin_computation().unwrap();

    assert!(matches!(core.begin_computation(), Err(AlgorithmError::AlreadyRunning)));

    assert_eq!(guard.finish().unwrap(), ComputationState::Finished);
    assert!(matches!(
        core.end_computation(),
        Err(AlgorithmError::InvalidStateTransition { .. })
    ));
}

#[test]
fn test_abort_reaches_hosted_searches() {
    init_logger();
    let mut graph = grid(6);
    let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);
    augmentor.add_reversed_edges().unwrap();
    let synthetic = augmentor.augmented_edges().clone();
    let capacity = |e: EdgeId| if synthetic.contains(&e) { 0.0 } else { 1.0 };
    let mut flow = EdmondsKarpMaximumFlow::new(augmentor.graph(), capacity, augmentor.reversed_edges());
    let handle = flow.abort_handle();
    let aborter = flow.on_augmentation(move |_| handle.abort());

    flow.compute_between(VertexId(0), VertexId(35)).unwrap();

    assert_eq!(flow.state(), ComputationState::Aborted);
    assert_eq!(flow.augmentations(), 1);
    assert_eq!(flow.max_flow(), 1.0);

    aborter.detach();
    flow.compute().unwrap();
    assert_eq!(flow.state(), ComputationState::Finished);
    assert_eq!(flow.max_flow(), 2.0);
}

#[test]
fn test_cancel_notices() {
    init_logger();
    let graph = grid(4);
    let mut bfs = BreadthFirstSearch::new(&graph);
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notices);
    let _n = bfs
        .core()
        .cancel_manager()
        .on_notice(move |notice| sink.lock().unwrap().push(*notice));
    let handle = bfs.abort_handle();
    let _d = bfs.search_events().subscribe(move |event| {
        if event.kind() == EventKind::FinishVertex {
            handle.abort();
        }
    });

    bfs.compute_from(VertexId(0)).unwrap();
    assert_eq!(bfs.state(), ComputationState::Aborted);

    bfs.compute_from(VertexId(0)).unwrap();
    assert_eq!(
        *notices.lock().unwrap(),
        vec![CancelNotice::Requested, CancelNotice::Reset, CancelNotice::Requested]
    );
}
