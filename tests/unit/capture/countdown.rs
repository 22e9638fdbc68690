use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn zero_seconds_is_rejected() {
    assert!(Countdown::start(0, ms(0)).is_err());
}

#[test]
fn ticks_three_two_one_then_completes_once() {
    let mut cd = Countdown::start(3, ms(500)).unwrap();
    assert_eq!(cd.poll(ms(500)), vec![CountdownEvent::Tick { remaining: 3 }]);
    assert!(cd.poll(ms(1499)).is_empty());
    assert_eq!(cd.poll(ms(1500)), vec![CountdownEvent::Tick { remaining: 2 }]);
    assert_eq!(cd.remaining(), 2);
    assert_eq!(cd.poll(ms(2500)), vec![CountdownEvent::Tick { remaining: 1 }]);
    assert_eq!(cd.next_deadline(), Some(ms(3500)));
    assert_eq!(cd.poll(ms(3500)), vec![CountdownEvent::Completed]);
    assert!(cd.is_completed());
    assert_eq!(cd.remaining(), 0);
    assert!(cd.poll(ms(10_000)).is_empty());
    assert_eq!(cd.next_deadline(), None);
}

#[test]
fn a_late_poll_catches_up_in_order() {
    let mut cd = Countdown::start(3, ms(0)).unwrap();
    assert_eq!(
        cd.poll(ms(7_000)),
        vec![
            CountdownEvent::Tick { remaining: 3 },
            CountdownEvent::Tick { remaining: 2 },
            CountdownEvent::Tick { remaining: 1 },
            CountdownEvent::Completed,
        ]
    );
}

#[test]
fn cancel_before_zero_never_completes() {
    let mut cd = Countdown::start(3, ms(0)).unwrap();
    cd.poll(ms(1_200));
    cd.cancel();
    assert!(cd.poll(ms(5_000)).is_empty());
    assert!(!cd.is_completed());
    assert!(cd.is_cancelled());
    assert_eq!(cd.next_deadline(), None);
}

#[test]
fn restart_is_independent_of_previous_instance() {
    let mut first = Countdown::start(2, ms(0)).unwrap();
    first.poll(ms(1_000));
    first.cancel();
    let mut second = Countdown::start(2, ms(1_000)).unwrap();
    assert_eq!(second.poll(ms(1_000)), vec![CountdownEvent::Tick { remaining: 2 }]);
    assert_eq!(
        second.poll(ms(3_000)),
        vec![CountdownEvent::Tick { remaining: 1 }, CountdownEvent::Completed]
    );
}
