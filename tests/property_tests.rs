use proptest::prelude::*;
use input_settle::{Engine, FieldBuffer, MonitorOptions, Signal, TargetId};

mod support;
use support::recorder::Recorder;
use support::{A, B, key, ms};

const FREQ: u64 = 1000;

#[derive(Debug, Clone)]
enum Op {
    Type(String),
    Backspace,
    Set(String),
    Key(char),
    Paste(String),
    Commit,
    Wait(u64),
}

// Small alphabet so repeated values and whitespace-only edits are common
fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(" ".to_string()),
        "[ab ]{1,3}",
        "[a-c]{0,4}",
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        text_strategy().prop_map(Op::Type),
        Just(Op::Backspace),
        text_strategy().prop_map(Op::Set),
        prop_oneof![Just('a'), Just(','), Just('.'), Just(' ')].prop_map(Op::Key),
        text_strategy().prop_map(Op::Paste),
        Just(Op::Commit),
        (0u64..2500).prop_map(Op::Wait),
    ]
}

fn apply(eng: &mut Engine, buf: &mut FieldBuffer, target: TargetId, op: &Op) {
    match op {
        Op::Type(s) => {
            buf.type_str(target, s);
            eng.handle_signal(&*buf, target, key(s.chars().last().unwrap_or('x')));
        }
        Op::Backspace => {
            buf.backspace(target);
            eng.handle_signal(&*buf, target, Signal::Key(input_settle::KeyCode::Backspace.into()));
        }
        Op::Set(s) => {
            buf.set(target, s);
        }
        Op::Key(c) => {
            eng.handle_signal(&*buf, target, key(*c));
        }
        Op::Paste(s) => {
            eng.handle_signal(&*buf, target, Signal::Paste);
            buf.type_str(target, s);
            eng.run_pending(&*buf);
        }
        Op::Commit => {
            eng.handle_signal(&*buf, target, Signal::Commit);
        }
        Op::Wait(n) => {
            eng.advance(&*buf, ms(*n));
        }
    }
}

proptest! {
    #[test]
    fn consecutive_notifications_always_differ(
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut buf = FieldBuffer::new().with(A, "");
        let rec = Recorder::new();
        let mut eng = Engine::new();
        eng.attach(&buf, [A], rec.options(MonitorOptions::builder().frequency_ms(FREQ))).unwrap();

        for op in &ops {
            apply(&mut eng, &mut buf, A, op);
        }

        let values = rec.values();
        for pair in values.windows(2) {
            prop_assert_ne!(&pair[0], &pair[1]);
        }
        for v in &values {
            prop_assert_eq!(v.trim(), v.as_str());
        }
    }

    #[test]
    fn empty_values_never_notify_when_gated(
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut buf = FieldBuffer::new().with(A, "");
        let rec = Recorder::new();
        let mut eng = Engine::new();
        eng.attach(
            &buf,
            [A],
            rec.options(MonitorOptions::builder().frequency_ms(FREQ).empty_value_triggers(false)),
        )
        .unwrap();

        for op in &ops {
            apply(&mut eng, &mut buf, A, op);
        }
        prop_assert!(rec.values().iter().all(|v| !v.is_empty()));
    }

    #[test]
    fn timer_is_always_armed_until_detach(
        ops in prop::collection::vec(op_strategy(), 0..40),
        freq in 1u64..3000,
    ) {
        let mut buf = FieldBuffer::new().with(A, "");
        let mut eng = Engine::new();
        let h = eng.attach(&buf, [A], MonitorOptions::builder().frequency_ms(freq).build()).unwrap();

        for op in &ops {
            apply(&mut eng, &mut buf, A, op);
            let snap = eng.snapshot(A).unwrap();
            prop_assert!(snap.timer_due.is_some());
            prop_assert!(snap.timer_due.unwrap() > eng.now());
        }

        eng.detach(h);
        prop_assert_eq!(eng.pending_tasks(), 0);
        prop_assert!(!eng.detach(h));
    }

    #[test]
    fn quiet_period_yields_exactly_one_evaluation(
        gaps in prop::collection::vec(0u64..FREQ, 1..20),
        word in "[a-z]{1,8}",
        already_sent in any::<bool>(),
    ) {
        let mut buf = FieldBuffer::new().with(A, "");
        let rec = Recorder::new();
        let mut eng = Engine::new();
        eng.attach(&buf, [A], rec.options(MonitorOptions::builder().frequency_ms(FREQ))).unwrap();

        if already_sent {
            buf.set(A, &word);
            eng.handle_signal(&buf, A, Signal::Commit);
            rec.clear();
        }

        buf.set(A, "");
        for (gap, c) in gaps.iter().zip(word.chars().cycle()) {
            eng.advance(&buf, ms(*gap));
            eng.handle_signal(&buf, A, key(c));
        }
        buf.set(A, &word);
        let before = eng.snapshot(A).unwrap().evaluations;

        eng.advance(&buf, ms(FREQ - 1));
        prop_assert_eq!(eng.snapshot(A).unwrap().evaluations, before);

        eng.advance(&buf, ms(1));
        prop_assert_eq!(eng.snapshot(A).unwrap().evaluations, before + 1);
        prop_assert_eq!(rec.len(), usize::from(!already_sent));
    }

    #[test]
    fn group_reports_last_sender(
        senders in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let buf = FieldBuffer::new().with(A, "from a").with(B, "from b");
        let rec = Recorder::new();
        let mut eng = Engine::new();
        eng.attach(
            &buf,
            [A, B],
            rec.options(
                MonitorOptions::builder()
                    .monitor_as_group(true)
                    .trigger_on_init(false)
                    .frequency_ms(FREQ),
            ),
        )
        .unwrap();

        for &is_a in &senders {
            eng.handle_signal(&buf, if is_a { A } else { B }, key('z'));
        }
        let last = if senders[senders.len() - 1] { A } else { B };
        let expected = if last == A { "from a" } else { "from b" };

        prop_assert_eq!(eng.advance(&buf, ms(FREQ)), 1);
        prop_assert_eq!(rec.calls(), vec![(expected.to_string(), last)]);
    }
}
