use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn style(text: &str) -> StyleConfig {
    StyleConfig {
        text: text.to_string(),
        ..StyleConfig::default()
    }
}

#[test]
fn rapid_edits_collapse_into_the_latest() {
    let mut q = RecomposeQueue::new(ms(150));
    q.request(style("H"), ms(0));
    q.request(style("He"), ms(40));
    let last = q.request(style("Hel"), ms(80));

    assert!(q.take_due(ms(229)).is_none());
    let req = q.take_due(ms(230)).unwrap();
    assert_eq!(req.generation, last);
    assert_eq!(req.style.text, "Hel");
    assert!(q.take_due(ms(1_000)).is_none());
}

#[test]
fn in_flight_result_goes_stale_when_a_newer_request_arrives() {
    let mut q = RecomposeQueue::new(ms(150));
    q.request(style("a"), ms(0));
    let in_flight = q.take_due(ms(150)).unwrap();
    assert!(q.is_current(in_flight.generation));

    q.request(style("b"), ms(160));
    assert!(!q.is_current(in_flight.generation));
    assert!(q.has_pending());
}

#[test]
fn invalidate_discards_pending_and_in_flight() {
    let mut q = RecomposeQueue::new(ms(0));
    let g = q.request_now(style("a"), ms(5));
    q.invalidate();
    assert!(!q.is_current(g));
    assert!(q.take_due(ms(100)).is_none());
    assert_eq!(q.next_deadline(), None);
}

#[test]
fn generations_increase() {
    let mut q = RecomposeQueue::new(ms(10));
    let a = q.request(style("a"), ms(0));
    let b = q.request(style("b"), ms(0));
    assert!(b > a);
    assert_eq!(b.get(), a.get() + 1);
}
