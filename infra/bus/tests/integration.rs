pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use radio_bus::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_channel_lookup_is_idempotent() {
        let radio = Radio::new();
        let first = radio.channel("app").unwrap();
        let second = radio.channel("app").unwrap();

        assert_eq!(first, second);
        first.reply("shared", json!(true));
        assert!(second.has_request("shared"));
    }

    #[test]
    fn test_empty_channel_name_raises() {
        let radio = Radio::new();
        let err = radio.channel("").unwrap_err();

        assert!(matches!(err, RadioError::InvalidChannelName { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid channel name: You must provide a name for the channel"
        );
    }

    #[test]
    fn test_command_invokes_handler_and_returns_channel() {
        let channel = Radio::new().channel("app").unwrap();
        let (handler, calls) = recorder();

        let returned = channel.comply("foo", handler).command("foo", &[json!(1), json!(2)]);

        assert_eq!(returned, &channel);
        assert_eq!(*calls.lock(), vec![vec![json!(1), json!(2)]]);
    }

    #[test]
    fn test_request_returns_handler_result() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply(
            "sum",
            Handler::new(|_, args| json!(args.iter().filter_map(Value::as_i64).sum::<i64>())),
        );

        assert_eq!(channel.request("sum", &[json!(1), json!(2)]), Response::Single(Some(json!(3))));
    }

    #[test]
    fn test_default_handler_receives_full_arguments() {
        let channel = Radio::new().channel("app").unwrap();
        let (handler, calls) = recorder();
        channel.comply(DEFAULT_HANDLER, handler);

        channel.command("bar", &[]).command("baz", &[json!(1)]);

        assert_eq!(*calls.lock(), vec![vec![json!("bar")], vec![json!("baz"), json!(1)]]);
    }

    #[test]
    fn test_unnamed_command_pads_default_only_when_arguments_follow() {
        let channel = Radio::new().channel("app").unwrap();
        let (handler, calls) = recorder();
        channel.comply(DEFAULT_HANDLER, handler);

        channel.command(Key::Any, &[]).command("", &[json!(1)]);

        assert_eq!(*calls.lock(), vec![vec![], vec![Value::Null, json!(1)]]);
    }

    #[test]
    fn test_reply_map_converts_values_into_replies() {
        let channel = Radio::new().channel("app").unwrap();
        let settings = [("version", "1.0"), ("name", "radio")];

        channel.reply(
            Key::map(settings.iter().map(|&(name, value)| (name, json!(value)))),
            Registration::<Reply>::empty(),
        );

        assert_eq!(channel.request("version name", &[]).into_value(), Some(json!(["1.0", "radio"])));
    }

    #[test]
    fn test_default_request_fallback_is_per_name_in_fanout() {
        let channel = Radio::new().channel("app").unwrap();
        channel
            .reply("foo", json!("specific"))
            .reply(DEFAULT_HANDLER, Handler::new(|_, args| json!(["default", args[0]])));

        assert_eq!(
            channel.request("foo bar", &[]).into_value(),
            Some(json!(["specific", ["default", "bar"]]))
        );
    }

    #[test]
    fn test_comply_once_runs_once() {
        let channel = Radio::new().channel("app").unwrap();
        let (handler, calls) = recorder();

        channel.comply_once("foo", handler).command("foo", &[]).command("foo", &[]);

        assert_eq!(calls.lock().len(), 1);
        assert!(!channel.has_command("foo"));
    }

    #[test]
    fn test_comply_mapping_registers_each_name() {
        let channel = Radio::new().channel("app").unwrap();
        let (foo, foo_calls) = recorder();
        let (bar, bar_calls) = recorder();

        channel.comply([("foo", foo), ("bar", bar)], Registration::empty());
        channel.command("foo", &[json!(1)]).command("bar", &[json!(2)]);

        assert_eq!(*foo_calls.lock(), vec![vec![json!(1)]]);
        assert_eq!(*bar_calls.lock(), vec![vec![json!(2)]]);
    }

    #[test]
    fn test_mapping_shares_the_explicit_context() {
        let channel = Radio::new().channel("app").unwrap();
        let context = Context::new("view");
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let expected = context.clone();
        let check = Handler::new(move |context, _| {
            if context == &expected {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            Value::Null
        });

        channel.comply(
            [("foo", check.clone()), ("bar", check)],
            Registration::empty().with_context(context),
        );
        channel.command("foo bar", &[]);

        assert_eq!(seen.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_request_multiple_names_returns_ordered_results() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply("foo", json!("a")).reply("bar", json!("b"));

        assert_eq!(
            channel.request("foo bar", &[]),
            Response::Many(vec![Response::Single(Some(json!("a"))), Response::Single(Some(json!("b")))])
        );
        assert_eq!(
            channel.request(Key::names(["bar", "foo"]), &[]).into_value(),
            Some(json!(["b", "a"]))
        );
    }

    #[test]
    fn test_request_mapping_prepends_values() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply("add", Handler::new(|_, args| json!(args[0].as_i64().unwrap_or(0) + 10)));

        assert_eq!(
            channel.request([("add", json!(1)), ("add", json!(5))], &[]).into_value(),
            Some(json!([11, 15]))
        );
    }

    #[test]
    fn test_stop_replying_removes_the_reply() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply("foo", echo()).stop_replying("foo", Filter::any());

        assert_eq!(channel.request("foo", &[json!(1)]), Response::Single(None));
    }

    #[test]
    fn test_stop_replying_respects_callback_filter() {
        let channel = Radio::new().channel("app").unwrap();
        let handler = echo();
        channel.reply("foo", handler.clone());

        channel.stop_replying("foo", echo());
        assert!(channel.has_request("foo"));

        channel.stop_replying("foo", handler);
        assert!(!channel.has_request("foo"));
    }

    #[test]
    fn test_stop_complying_by_context_across_names() {
        let channel = Radio::new().channel("app").unwrap();
        let view = Context::new("view");
        let (handler, _) = recorder();

        channel
            .comply("a", (handler.clone(), view.clone()))
            .comply("b", (handler.clone(), view.clone()))
            .comply("c", handler);
        channel.stop_complying(Key::<Handler>::Any, view);

        assert!(!channel.has_command("a"));
        assert!(!channel.has_command("b"));
        assert!(channel.has_command("c"));
    }

    #[test]
    fn test_constant_reply() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply("foo", json!(42));

        assert_eq!(channel.request("foo", &[]).into_value(), Some(json!(42)));
    }

    #[test]
    fn test_reply_once_answers_once_and_unregisters() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply_once("token", json!("abc"));

        assert_eq!(channel.request("token", &[]).into_value(), Some(json!("abc")));
        assert_eq!(channel.request("token", &[]).into_value(), None);
    }

    #[test]
    fn test_reply_once_reregistration_survives_the_adapter() {
        let channel = Radio::new().channel("app").unwrap();
        channel.reply_once(
            "next",
            Handler::new(|context, _| {
                if let Some(channel) = context.channel() {
                    channel.reply("next", json!("second"));
                }
                json!("first")
            }),
        );

        assert_eq!(channel.request("next", &[]).into_value(), Some(json!("first")));
        assert_eq!(channel.request("next", &[]).into_value(), Some(json!("second")));
    }

    #[test]
    fn test_reply_once_is_gone_for_requests_made_from_inside_it() {
        let channel = Radio::new().channel("app").unwrap();
        let nested = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = nested.clone();
        channel.reply_once(
            "token",
            Handler::new(move |context, _| {
                if let Some(channel) = context.channel() {
                    seen.lock().push(channel.request("token", &[]));
                    channel.reply(DEFAULT_HANDLER, json!("fallback"));
                    seen.lock().push(channel.request("token", &[]));
                }
                json!("abc")
            }),
        );

        assert_eq!(channel.request("token", &[]).into_value(), Some(json!("abc")));
        assert_eq!(
            *nested.lock(),
            vec![Response::Single(None), Response::Single(Some(json!("fallback")))]
        );
    }

    #[test]
    fn test_stop_replying_matches_original_of_reply_once() {
        let channel = Radio::new().channel("app").unwrap();
        let handler = echo();
        channel.reply_once("foo", handler.clone()).stop_replying("foo", handler);

        assert!(!channel.has_request("foo"));
    }

    #[test]
    fn test_requests_and_commands_are_separate() {
        let channel = Radio::new().channel("app").unwrap();
        let (handler, calls) = recorder();
        channel.comply("foo", handler);

        assert_eq!(channel.request("foo", &[]), Response::Single(None));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let radio = Radio::new();
        let channel = radio.channel("app").unwrap();
        let other = radio.channel("other").unwrap();
        let (handler, calls) = recorder();

        channel
            .on("change", handler.clone())
            .comply("save", handler.clone())
            .reply("load", json!(1))
            .listen_to(&other, "ping", Some(handler));
        channel.reset();

        channel.trigger("change", &[]).command("save", &[]);
        other.trigger("ping", &[]);

        assert!(calls.lock().is_empty());
        assert_eq!(channel.request("load", &[]), Response::Single(None));
        assert!(channel.events().is_empty());
        assert_eq!(channel.events().listening_count(), 0);
        assert_eq!(radio.channel("app").unwrap(), channel);
    }

    #[test]
    fn test_trigger_fans_out_and_reaches_all_listeners() {
        let channel = Radio::new().channel("app").unwrap();
        let (named, named_calls) = recorder();
        let (all, all_calls) = recorder();

        channel.on("open close", named).on(ALL_EVENTS, all);
        channel.trigger("open close", &[json!(1)]);

        assert_eq!(named_calls.lock().len(), 2);
        assert_eq!(
            *all_calls.lock(),
            vec![vec![json!("open"), json!(1)], vec![json!("close"), json!(1)]]
        );
    }

    #[test]
    fn test_removing_a_listener_during_trigger_keeps_dispatch_intact() {
        let channel = Radio::new().channel("app").unwrap();
        let (second, second_calls) = recorder();
        let victim = second.clone();
        let remover = Handler::effect(move |context, _| {
            if let Some(channel) = context.channel() {
                channel.off("tick", victim.clone());
            }
        });

        channel.on("tick", remover).on("tick", second);
        channel.trigger("tick", &[]).trigger("tick", &[]);

        assert_eq!(second_calls.lock().len(), 1);
    }

    #[test]
    fn test_listen_to_uses_listener_context() {
        let radio = Radio::new();
        let source = radio.channel("source").unwrap();
        let sink = radio.channel("sink").unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let names = seen.clone();

        sink.listen_to(
            &source,
            "change",
            Some(Handler::effect(move |context, _| {
                if let Some(channel) = context.channel() {
                    names.lock().push(channel.name().to_owned());
                }
            })),
        );
        source.trigger("change", &[]);

        assert_eq!(*seen.lock(), vec!["sink".to_owned()]);
        assert_eq!(sink.events().listening_count(), 1);
    }

    #[test]
    fn test_stop_listening_without_arguments_detaches_everything() {
        let radio = Radio::new();
        let a = radio.channel("a").unwrap();
        let b = radio.channel("b").unwrap();
        let listener = EventBus::new();
        let (handler, calls) = recorder();

        listener
            .listen_to(&a, "x", Some(handler.clone()))
            .listen_to(&b, "y", Some(handler.clone()));
        b.on("y", handler);
        listener.stop_listening(None, Key::<Handler>::Any, None);

        a.trigger("x", &[]);
        b.trigger("y", &[]);

        assert_eq!(calls.lock().len(), 1);
        assert_eq!(listener.listening_count(), 0);
    }

    #[test]
    fn test_stop_listening_to_one_target() {
        let radio = Radio::new();
        let a = radio.channel("a").unwrap();
        let b = radio.channel("b").unwrap();
        let listener = EventBus::new();
        let (handler, calls) = recorder();

        listener.listen_to(&a, "x", Some(handler.clone())).listen_to(&b, "x", Some(handler));
        listener.stop_listening(Some(&a), "x", None);

        a.trigger("x", &[]);
        b.trigger("x", &[]);

        assert_eq!(calls.lock().len(), 1);
        assert_eq!(listener.listening_count(), 1);
    }

    #[test]
    fn test_listen_to_once() {
        let source = EventBus::new();
        let listener = EventBus::new();
        let (handler, calls) = recorder();

        listener.listen_to_once(&source, "ready", Some(handler));
        source.trigger("ready", &[]).trigger("ready", &[]);

        assert_eq!(calls.lock().len(), 1);
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = Radio::new();
        let second = Radio::new();
        first.reply("app", "answer", json!(1)).unwrap();

        assert_ne!(first.channel("app").unwrap(), second.channel("app").unwrap());
        assert_eq!(second.request("app", "answer", &[]).unwrap(), Response::Single(None));
    }

    #[test]
    fn test_debug_warnings_only_when_enabled() {
        let capture = LogCapture::default();
        let radio = Radio::new();

        capture.run(|| {
            radio.command("app", "save", &[]).unwrap();
            radio.set_debug(true);
            radio.command("app", "save", &[]).unwrap();
            radio.request("app", "load", &[]).unwrap();
        });

        assert_eq!(capture.count("An unhandled command was fired on the app channel: \"save\""), 1);
        assert_eq!(capture.count("An unhandled request was fired on the app channel: \"load\""), 1);
        assert!(capture.lines().iter().all(|line| line.contains("radio::debug")));
    }

    #[test]
    fn test_overwrite_and_unregistered_warnings() {
        let capture = LogCapture::default();
        let radio = Radio::new();
        radio.set_debug(true);

        capture.run(|| {
            radio.comply("app", "save", echo()).unwrap();
            radio.comply("app", "save", echo()).unwrap();
            radio.reply("app", "load", json!(1)).unwrap();
            radio.reply("app", "load", json!(2)).unwrap();
            radio.stop_complying("app", "missing", Filter::any()).unwrap();
            radio.stop_replying("app", "missing", Filter::any()).unwrap();
        });

        assert_eq!(capture.count("A command was overwritten on the app channel: \"save\""), 1);
        assert_eq!(capture.count("A request was overwritten on the app channel: \"load\""), 1);
        assert_eq!(
            capture.count("Attempted to remove the unregistered command on the app channel: \"missing\""),
            1
        );
        assert_eq!(
            capture.count("Attempted to remove the unregistered request on the app channel: \"missing\""),
            1
        );
    }

    #[test]
    fn test_tune_in_logs_each_event_once() {
        let capture = LogCapture::default();
        let radio = Radio::new();
        let channel = radio.channel("x").unwrap();

        capture.run(|| {
            radio.tune_in("x").unwrap().tune_in("x").unwrap();
            channel.trigger("change", &[json!(1)]);
            radio.tune_out("x").unwrap().tune_out("x").unwrap();
            channel.trigger("change", &[json!(2)]);
        });

        assert_eq!(capture.count("[x] \"change\""), 1);
        assert_eq!(capture.count("radio::activity"), 1);
    }

    #[test]
    fn test_tuned_in_channel_logs_commands_and_requests() {
        let capture = LogCapture::default();
        let radio = Radio::new();

        capture.run(|| {
            radio.tune_in("x").unwrap();
            radio.command("x", "save", &[json!(1)]).unwrap();
            radio.request("x", "load", &[]).unwrap();
        });

        assert_eq!(capture.count("[x] \"save\""), 1);
        assert_eq!(capture.count("[x] \"load\""), 1);
    }

    #[test]
    fn test_log_writes_one_activity_line() {
        let capture = LogCapture::default();
        let radio = Radio::new();

        capture.run(|| {
            radio.log("app", "boot", &[json!({ "ok": true })]);
        });

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[app] \"boot\""));
        assert!(lines[0].contains("channel=\"app\""));
        assert!(lines[0].contains(r#"args=[{"ok":true}]"#), "{}", lines[0]);
    }

    #[test]
    fn test_top_level_mirrors_cover_events() {
        let radio = Radio::new();
        let (handler, calls) = recorder();

        radio.on("app", "ping", handler.clone()).unwrap();
        radio.trigger("app", "ping", &[json!(1)]).unwrap();
        radio.off("app", "ping", handler).unwrap();
        radio.trigger("app", "ping", &[json!(2)]).unwrap();

        assert_eq!(*calls.lock(), vec![vec![json!(1)]]);
    }
}
