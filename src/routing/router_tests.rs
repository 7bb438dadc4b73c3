//! Tests for `Router` registration and dispatch.

use super::{BoxError, Callback, CallbackFuture, Router, RouterError};
use crate::sansio::Event;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Records which callbacks ran, in order.
type Log = Arc<Mutex<Vec<String>>>;

fn recorder(name: &'static str) -> Callback<Log> {
    Arc::new(move |_event: Arc<Event>, log: Log| -> CallbackFuture {
        Box::pin(async move {
            log.lock().unwrap().push(name.to_string());
            Ok::<(), BoxError>(())
        })
    })
}

fn failing(name: &'static str) -> Callback<Log> {
    Arc::new(move |_event: Arc<Event>, log: Log| -> CallbackFuture {
        Box::pin(async move {
            log.lock().unwrap().push(name.to_string());
            Err::<(), BoxError>(format!("{name} failed").into())
        })
    })
}

fn issue_event(action: Value) -> Event {
    Event::new(
        json!({"object_attributes": {"action": action, "iid": 7}}),
        "Issue Hook",
        None,
    )
}

fn calls(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

mod registration {
    use super::*;

    #[test]
    fn too_many_attributes_is_rejected() {
        let mut router: Router<Log> = Router::new();

        let result = router.add(
            recorder("a"),
            "Issue Hook",
            &[("action", json!("open")), ("iid", json!(7))],
        );

        assert!(matches!(
            result,
            Err(RouterError::TooManyAttributes { count: 2 })
        ));
        assert!(router.is_empty());
    }

    #[test]
    fn len_counts_shallow_and_deep() {
        let mut router: Router<Log> = Router::new();
        router.add(recorder("a"), "Push Hook", &[]).unwrap();
        router
            .add(recorder("b"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();
        router
            .add(recorder("c"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();

        assert_eq!(router.len(), 3);
        assert!(!router.is_empty());
    }

    #[tokio::test]
    async fn register_returns_reusable_callback() {
        let mut first: Router<Log> = Router::new();
        let callback = first
            .register("Push Hook", &[], |_event, log: Log| async move {
                log.lock().unwrap().push("registered".to_string());
                Ok(())
            })
            .unwrap();
        let mut second: Router<Log> = Router::new();
        second.add(callback, "Tag Push Hook", &[]).unwrap();
        let log = Log::default();

        let event = Event::new(json!({}), "Tag Push Hook", None);
        let invoked = second.dispatch(&event, Arc::clone(&log)).await.unwrap();

        assert_eq!(invoked, 1);
        assert_eq!(calls(&log), vec!["registered"]);
    }
}

mod dispatch {
    use super::*;

    #[tokio::test]
    async fn shallow_route_matches_event_type() {
        let mut router: Router<Log> = Router::new();
        router.add(recorder("push"), "Push Hook", &[]).unwrap();
        let log = Log::default();

        let event = Event::new(json!({}), "Push Hook", None);
        let invoked = router.dispatch(&event, Arc::clone(&log)).await.unwrap();

        assert_eq!(invoked, 1);
        assert_eq!(calls(&log), vec!["push"]);
    }

    #[tokio::test]
    async fn other_event_types_are_ignored() {
        let mut router: Router<Log> = Router::new();
        router.add(recorder("push"), "Push Hook", &[]).unwrap();
        let log = Log::default();

        let invoked = router
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap();

        assert_eq!(invoked, 0);
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn deep_route_matches_attribute_value() {
        let mut router: Router<Log> = Router::new();
        router
            .add(recorder("open"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();
        router
            .add(recorder("close"), "Issue Hook", &[("action", json!("close"))])
            .unwrap();
        let log = Log::default();

        router
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap();

        assert_eq!(calls(&log), vec!["open"]);
    }

    #[tokio::test]
    async fn deep_route_needs_attribute_present() {
        let mut router: Router<Log> = Router::new();
        router
            .add(recorder("label"), "Issue Hook", &[("label", json!("bug"))])
            .unwrap();
        let log = Log::default();

        let invoked = router
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap();

        assert_eq!(invoked, 0);
    }

    #[tokio::test]
    async fn non_string_values_match() {
        let mut router: Router<Log> = Router::new();
        router
            .add(recorder("seven"), "Issue Hook", &[("iid", json!(7))])
            .unwrap();
        let log = Log::default();

        router
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap();

        assert_eq!(calls(&log), vec!["seven"]);
    }

    #[tokio::test]
    async fn shallow_callbacks_run_before_deep_ones() {
        let mut router: Router<Log> = Router::new();
        router
            .add(recorder("deep"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();
        router.add(recorder("shallow"), "Issue Hook", &[]).unwrap();
        router.add(recorder("shallow-2"), "Issue Hook", &[]).unwrap();
        let log = Log::default();

        let invoked = router
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap();

        assert_eq!(invoked, 3);
        assert_eq!(calls(&log), vec!["shallow", "shallow-2", "deep"]);
    }

    #[tokio::test]
    async fn empty_router_dispatches_nothing() {
        let router: Router<Log> = Router::new();

        let invoked = router
            .dispatch(&issue_event(json!("open")), Log::default())
            .await
            .unwrap();

        assert_eq!(invoked, 0);
    }

    #[tokio::test]
    async fn failure_does_not_stop_other_callbacks() {
        let mut router: Router<Log> = Router::new();
        router.add(failing("first"), "Issue Hook", &[]).unwrap();
        router.add(recorder("second"), "Issue Hook", &[]).unwrap();
        router
            .add(failing("third"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();
        let log = Log::default();

        let err = router
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap_err();

        assert_eq!(calls(&log), vec!["first", "second", "third"]);
        assert_eq!(err.invoked, 3);
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].to_string(), "first failed");
        assert_eq!(err.event_type, "Issue Hook");
    }

    #[tokio::test]
    async fn callback_receives_event() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::default();
        let mut router: Router<Arc<Mutex<Option<Value>>>> = Router::new();
        router
            .register("Issue Hook", &[], |event, seen: Arc<Mutex<Option<Value>>>| async move {
                *seen.lock().unwrap() = Some(event.object_attributes()["iid"].clone());
                Ok(())
            })
            .unwrap();

        router
            .dispatch(&issue_event(json!("open")), Arc::clone(&seen))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(json!(7)));
    }
}

mod merging {
    use super::*;

    #[tokio::test]
    async fn merged_router_keeps_all_routes_in_order() {
        let mut first: Router<Log> = Router::new();
        first.add(recorder("first-shallow"), "Issue Hook", &[]).unwrap();
        first
            .add(recorder("first-deep"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();
        let mut second: Router<Log> = Router::new();
        second.add(recorder("second-shallow"), "Issue Hook", &[]).unwrap();
        second
            .add(recorder("second-deep"), "Issue Hook", &[("action", json!("open"))])
            .unwrap();
        second.add(recorder("push"), "Push Hook", &[]).unwrap();

        let merged = Router::merge([&first, &second]);
        let log = Log::default();
        merged
            .dispatch(&issue_event(json!("open")), Arc::clone(&log))
            .await
            .unwrap();

        assert_eq!(merged.len(), 5);
        assert_eq!(
            calls(&log),
            vec!["first-shallow", "second-shallow", "first-deep", "second-deep"]
        );
    }
}
