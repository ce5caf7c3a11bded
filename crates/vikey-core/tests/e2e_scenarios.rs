// Vikey End-to-End Test Scenarios
//
// These tests drive the interception pipeline with synthetic keystrokes
// and replay what it posts onto a model of the focused text field. No
// event tap or accessibility access is needed.
//
// Run with: cargo test --test e2e_scenarios

mod e2e_tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use vikey_core::event::{AppCommand, EventInterceptionPipeline, HotkeyBindings, Verdict};
    use vikey_core::input::{AppFilter, Keystroke, SENTINEL};
    use vikey_core::key::key_for_char;
    use vikey_core::output::{
        CharacterInjector, EventPoster, InjectionGate, NoAccessibility, PostChannel, PostError,
        SyntheticEvent, SyntheticKind,
    };
    use vikey_core::settings::{CodeTable, EngineSettings, InputMethod};
    use vikey_core::trace::{MemorySink, PassReason, TraceEvent};
    use vikey_core::transform::{encode, TransliterationEngine};
    use vikey_core::window::{
        FixedStrategy, FocusInfo, FocusProvider, InjectionDelays, InjectionMethod,
        InjectionStrategy, WindowError,
    };
    use vikey_core::{Key, Modifier, Modifiers, ResetReason};

    // =========================================================================
    // Test Helpers
    // =========================================================================

    #[derive(Default)]
    struct RecordingPoster {
        events: Mutex<Vec<(SyntheticEvent, PostChannel)>>,
    }

    impl RecordingPoster {
        fn events(&self) -> Vec<(SyntheticEvent, PostChannel)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventPoster for RecordingPoster {
        fn post(&self, event: &SyntheticEvent, channel: PostChannel) -> Result<(), PostError> {
            self.events.lock().unwrap().push((event.clone(), channel));
            Ok(())
        }
    }

    /// Focus answers; None makes the query fail
    struct ScriptedFocus(Mutex<Option<FocusInfo>>);

    impl ScriptedFocus {
        fn new(app_id: &str) -> Self {
            Self(Mutex::new(Some(FocusInfo::for_app(app_id))))
        }

        fn set(&self, focus: FocusInfo) {
            *self.0.lock().unwrap() = Some(focus);
        }

        fn fail(&self) {
            *self.0.lock().unwrap() = None;
        }
    }

    impl FocusProvider for ScriptedFocus {
        fn focused(&self) -> Result<FocusInfo, WindowError> {
            self.0
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| WindowError::QueryFailed("scripted".to_string()))
        }
    }

    fn quiet(method: InjectionMethod) -> InjectionStrategy {
        InjectionStrategy::new(method).with_delays(InjectionDelays::new(0, 0, 0))
    }

    /// A text field fed by the pipeline: passed keys type natively,
    /// swallowed keys are replaced by whatever was posted meanwhile.
    struct Harness {
        pipeline: EventInterceptionPipeline,
        poster: Arc<RecordingPoster>,
        focus: Arc<ScriptedFocus>,
        sink: Arc<MemorySink>,
        gate: Arc<InjectionGate>,
        screen: String,
        replayed: usize,
    }

    impl Harness {
        fn new(settings: EngineSettings) -> Self {
            Self::with_strategy(settings, quiet(InjectionMethod::Fast))
        }

        fn with_strategy(settings: EngineSettings, strategy: InjectionStrategy) -> Self {
            Self::build(settings, strategy, |pipeline| pipeline)
        }

        fn configured(
            configure: impl FnOnce(EventInterceptionPipeline) -> EventInterceptionPipeline,
        ) -> Self {
            Self::build(EngineSettings::default(), quiet(InjectionMethod::Fast), configure)
        }

        fn build(
            settings: EngineSettings,
            strategy: InjectionStrategy,
            configure: impl FnOnce(EventInterceptionPipeline) -> EventInterceptionPipeline,
        ) -> Self {
            let poster = Arc::new(RecordingPoster::default());
            let focus = Arc::new(ScriptedFocus::new("com.apple.TextEdit"));
            let sink = Arc::new(MemorySink::new());
            let gate = Arc::new(InjectionGate::new());
            let injector = CharacterInjector::new(
                poster.clone(),
                Arc::new(NoAccessibility),
                gate.clone(),
                sink.clone(),
            )
            .with_settle(Duration::ZERO);
            let pipeline = configure(EventInterceptionPipeline::new(
                TransliterationEngine::new(settings),
                Arc::new(injector),
                Arc::new(FixedStrategy(strategy)),
                focus.clone(),
                sink.clone(),
            ));
            Self {
                pipeline,
                poster,
                focus,
                sink,
                gate,
                screen: String::new(),
                replayed: 0,
            }
        }

        fn stroke(&mut self, stroke: Keystroke) -> Verdict {
            let verdict = self.pipeline.handle(&stroke);
            let native = verdict == Verdict::Pass
                && stroke.kind == vikey_core::EventKind::KeyDown
                && !stroke.modifiers.is_combo()
                && !stroke.is_synthetic();
            if native {
                if stroke.key == Key::DELETE {
                    self.erase();
                } else if let Some(c) = stroke.character {
                    self.screen.push(c);
                }
            }
            self.replay();
            verdict
        }

        fn replay(&mut self) {
            let events = self.poster.events();
            for (event, _) in &events[self.replayed..] {
                match &event.kind {
                    SyntheticKind::Key {
                        key, down: true, ..
                    } if *key == Key::DELETE => self.erase(),
                    SyntheticKind::Key {
                        key, down: true, ..
                    } if *key == Key::RETURN => self.screen.push('\n'),
                    SyntheticKind::Text(text) => self.screen.push_str(text),
                    _ => {}
                }
            }
            self.replayed = events.len();
        }

        /// One Delete removes one code unit; the field never deletes
        /// past its start
        fn erase(&mut self) {
            assert!(
                self.screen.pop().is_some(),
                "Delete on an empty field after {:?}",
                self.sink.events()
            );
        }

        fn key(&mut self, c: char) -> Verdict {
            let (key, shifted) = key_for_char(c).expect("typeable character");
            let modifiers = if shifted {
                Modifiers::empty().with(Modifier::Shift)
            } else {
                Modifiers::empty()
            };
            self.stroke(Keystroke::key_down(key, modifiers))
        }

        fn type_str(&mut self, text: &str) -> &mut Self {
            for c in text.chars() {
                self.key(c);
            }
            self
        }

        fn backspace(&mut self) -> Verdict {
            self.stroke(Keystroke::key_down(Key::DELETE, Modifiers::empty()))
        }

        fn delete_downs(&self) -> usize {
            self.poster
                .events()
                .iter()
                .filter(|(event, _)| {
                    matches!(
                        event.kind,
                        SyntheticKind::Key { key, down: true, .. } if key == Key::DELETE
                    )
                })
                .count()
        }
    }

    fn mods(list: &[Modifier]) -> Modifiers {
        list.iter().copied().collect()
    }

    // =========================================================================
    // Typing
    // =========================================================================

    #[test]
    fn test_telex_word_reaches_screen() {
        let mut h = Harness::new(EngineSettings::default());
        h.type_str("vieetj ");
        assert_eq!(h.screen, "việt ");
    }

    #[test]
    fn test_telex_sentence() {
        let mut h = Harness::new(EngineSettings::default());
        h.type_str("tieengs vieetj nam");
        assert_eq!(h.screen, "tiếng việt nam");
    }

    #[test]
    fn test_vni_word_reaches_screen() {
        let mut h = Harness::new(EngineSettings::default().with_method(InputMethod::Vni));
        h.type_str("vie65t");
        assert_eq!(h.screen, "việt");
    }

    #[test]
    fn test_double_trigger_toggles_off() {
        let mut h = Harness::new(EngineSettings::default());
        h.type_str("ass");
        assert_eq!(h.screen, "as");
    }

    #[test]
    fn test_plain_letters_are_not_swallowed() {
        let mut h = Harness::new(EngineSettings::default());
        assert_eq!(h.key('b'), Verdict::Pass);
        assert_eq!(h.key('a'), Verdict::Pass);
        assert!(h.poster.events().is_empty());
    }

    #[test]
    fn test_backspace_then_retype() {
        let mut h = Harness::new(EngineSettings::default());
        h.type_str("vieet");
        h.backspace();
        h.type_str("tj");
        assert_eq!(h.screen, "việt");
    }

    #[test]
    fn test_trace_order_for_an_edit() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        h.sink.take();
        assert_eq!(h.key('a'), Verdict::Swallow);

        let events = h.sink.take();
        let position = |pred: &dyn Fn(&TraceEvent) -> bool| events.iter().position(|e| pred(e));
        let received = position(&|e| matches!(e, TraceEvent::KeyReceived { .. })).unwrap();
        let edit = position(&|e| matches!(e, TraceEvent::EngineEdit { .. })).unwrap();
        let started = position(&|e| matches!(e, TraceEvent::InjectionStarted { .. })).unwrap();
        let finished = position(&|e| matches!(e, TraceEvent::InjectionFinished { .. })).unwrap();
        assert!(received < edit && edit < started && started < finished);
    }

    // =========================================================================
    // Gates
    // =========================================================================

    #[test]
    fn test_synthetic_events_pass_untouched() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        let ours = Keystroke::key_down(Key::A, Modifiers::empty()).with_user_data(SENTINEL);
        assert_eq!(h.pipeline.handle(&ours), Verdict::Pass);
        assert!(h
            .sink
            .events()
            .contains(&TraceEvent::Passed(PassReason::Synthetic)));
        // The engine never saw it: the next `a` still makes â
        assert_eq!(h.key('a'), Verdict::Swallow);
        h.replay();
        assert_eq!(h.screen, "â");
    }

    #[test]
    fn test_excluded_app_passes_everything() {
        let mut h = Harness::new(EngineSettings::default());
        h.focus.set(FocusInfo::for_app("com.apple.ScreenContinuity"));
        h.type_str("aa");
        assert_eq!(h.screen, "aa");
        assert!(h.poster.events().is_empty());
        assert!(h
            .sink
            .events()
            .contains(&TraceEvent::Passed(PassReason::ExcludedApp)));
    }

    #[test]
    fn test_user_excluded_app() {
        let filter = AppFilter::new(vec!["com.apple.TextEdit".to_string()]);
        let mut h = Harness::configured(|p| p.with_filter(filter));
        h.type_str("aa");
        assert_eq!(h.screen, "aa");
    }

    #[test]
    fn test_passthrough_strategy() {
        let mut h =
            Harness::with_strategy(EngineSettings::default(), quiet(InjectionMethod::Passthrough));
        h.type_str("aa");
        assert_eq!(h.screen, "aa");
        assert!(h.poster.events().is_empty());
    }

    #[test]
    fn test_key_up_passes() {
        let mut h = Harness::new(EngineSettings::default());
        let up = Keystroke::key_up(Key::A, Modifiers::empty());
        assert_eq!(h.pipeline.handle(&up), Verdict::Pass);
        assert!(h.pipeline.engine().buffer().is_empty());
    }

    #[test]
    fn test_repeat_resets_engine() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        let repeat = Keystroke::key_down(Key::A, Modifiers::empty()).with_repeat(true);
        assert_eq!(h.stroke(repeat), Verdict::Pass);
        assert!(h.pipeline.engine().buffer().is_empty());
        assert!(h
            .sink
            .events()
            .contains(&TraceEvent::Reset(ResetReason::Repeat)));
    }

    #[test]
    fn test_shortcut_resets_and_passes() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        let copy = Keystroke::key_down(Key::from(0x08), mods(&[Modifier::Command]));
        assert_eq!(h.stroke(copy), Verdict::Pass);
        h.key('a');
        assert_eq!(h.screen, "aa");
    }

    #[test]
    fn test_arrow_key_marks_mid_sentence() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        h.stroke(Keystroke::key_down(Key::LEFT, Modifiers::empty()));
        assert!(h.pipeline.session().typing_mid_sentence);
        assert!(h.pipeline.engine().buffer().is_empty());
    }

    #[test]
    fn test_mouse_click_resets() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        assert_eq!(h.stroke(Keystroke::mouse_down()), Verdict::Pass);
        h.key('a');
        assert_eq!(h.screen, "aa");
    }

    #[test]
    fn test_focus_change_resets() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        h.focus.set(FocusInfo::for_app("com.apple.Notes"));
        h.key('a');
        assert_eq!(h.screen, "aa");
        assert!(h
            .sink
            .events()
            .contains(&TraceEvent::Reset(ResetReason::FocusChanged)));
    }

    #[test]
    fn test_failed_focus_query_keeps_word() {
        let mut h = Harness::new(EngineSettings::default());
        h.type_str("vie");
        h.focus.fail();
        h.type_str("e");
        h.focus.set(FocusInfo::for_app("com.apple.TextEdit"));
        h.type_str("tj");
        assert_eq!(h.screen, "việt");
        assert!(!h
            .sink
            .events()
            .contains(&TraceEvent::Reset(ResetReason::FocusChanged)));
    }

    #[test]
    fn test_tab_resets() {
        let mut h = Harness::new(EngineSettings::default());
        h.key('a');
        assert_eq!(h.stroke(Keystroke::key_down(Key::TAB, Modifiers::empty())), Verdict::Pass);
        assert!(h.pipeline.engine().buffer().is_empty());
    }

    #[test]
    fn test_gate_timeout_is_reported() {
        let mut h = Harness::configured(|p| p.with_gate_timeout(Some(Duration::from_millis(5))));

        let gate = h.gate.clone();
        let _busy = gate.acquire();
        assert_eq!(h.key('a'), Verdict::Pass);
        assert!(h.sink.events().contains(&TraceEvent::GateTimeout));
    }

    // =========================================================================
    // Hotkeys
    // =========================================================================

    #[test]
    fn test_modifier_only_toggle() {
        let (tx, rx) = mpsc::channel();
        let mut h = Harness::configured(|p| p.with_commands(tx));

        let ctrl = mods(&[Modifier::Control]);
        let ctrl_shift = mods(&[Modifier::Control, Modifier::Shift]);
        h.stroke(Keystroke::flags_changed(Key::CONTROL, ctrl));
        h.stroke(Keystroke::flags_changed(Key::SHIFT, ctrl_shift));
        h.stroke(Keystroke::flags_changed(Key::SHIFT, ctrl));
        h.stroke(Keystroke::flags_changed(Key::CONTROL, Modifiers::empty()));

        assert!(!h.pipeline.is_vietnamese());
        assert_eq!(rx.try_recv(), Ok(AppCommand::VietnameseChanged(false)));

        h.type_str("aa");
        assert_eq!(h.screen, "aa");
        assert!(h.sink.events().contains(&TraceEvent::Passed(PassReason::Disabled)));
    }

    #[test]
    fn test_undo_typing_hotkey() {
        let mut bindings = HotkeyBindings::none();
        bindings.undo_typing = Some("Cmd-Shift-Z".parse().unwrap());
        let mut h = Harness::configured(|p| p.with_hotkeys(bindings));

        h.type_str("vieetj");
        assert_eq!(h.screen, "việt");
        let undo = Keystroke::key_down(Key::Z, mods(&[Modifier::Command, Modifier::Shift]));
        assert_eq!(h.stroke(undo), Verdict::Swallow);
        assert_eq!(h.screen, "vieetj");
    }

    // =========================================================================
    // Code tables
    // =========================================================================

    #[test]
    fn test_double_backspace_table_deletes_twice() {
        let settings = EngineSettings::default()
            .with_method(InputMethod::Vni)
            .with_code_table(CodeTable::VniWindows);
        let mut h = Harness::new(settings);
        h.type_str("a6");
        assert_eq!(h.screen, encode(CodeTable::VniWindows, "â"));
        let before = h.delete_downs();

        assert_eq!(h.backspace(), Verdict::Swallow);
        assert_eq!(h.delete_downs() - before, 2);
        assert_eq!(h.screen, "");
        assert!(h.pipeline.engine().buffer().is_empty());
    }

    #[test]
    fn test_wide_tables_keep_unmarked_letters() {
        for table in [CodeTable::VniWindows, CodeTable::UnicodeCompound] {
            let mut h = Harness::new(EngineSettings::default().with_code_table(table));
            h.type_str("viee");
            assert_eq!(h.screen, encode(table, "viê"), "{}", table);

            let mut h = Harness::new(EngineSettings::default().with_code_table(table));
            h.type_str("tieengs");
            assert_eq!(h.screen, encode(table, "tiếng"), "{}", table);

            let mut h = Harness::new(EngineSettings::default().with_code_table(table));
            h.type_str("tieengs vieetj nam");
            assert_eq!(h.screen, encode(table, "tiếng việt nam"), "{}", table);
        }
    }

    #[test]
    fn test_wide_tables_backspace_mixed_word() {
        for table in [CodeTable::VniWindows, CodeTable::UnicodeCompound] {
            let mut h = Harness::new(EngineSettings::default().with_code_table(table));
            h.type_str("vieetj");
            assert_eq!(h.backspace(), Verdict::Pass);
            assert_eq!(h.backspace(), Verdict::Swallow);
            assert_eq!(h.screen, encode(table, "vi"), "{}", table);
            assert_eq!(h.backspace(), Verdict::Pass);
            assert_eq!(h.screen, "v", "{}", table);
        }
    }

    #[test]
    fn test_unicode_backspace_passes() {
        let mut h = Harness::new(EngineSettings::default());
        h.type_str("aa");
        assert_eq!(h.backspace(), Verdict::Pass);
        assert_eq!(h.screen, "");
    }
}
