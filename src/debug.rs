#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records that a vehicle was pushed forward to restore the minimum spacing.
#[allow(unused)]
pub fn debug_spacing(vehicle: usize, from: f64, to: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "spacing",
            "vehicle": vehicle,
            "from": from,
            "to": to,
        }))
    })
}

/// Records that a vehicle's speed update was skipped due to a runaway acceleration.
#[allow(unused)]
pub fn debug_instability(vehicle: usize, acc: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "instability",
            "vehicle": vehicle,
            "acc": if acc.is_finite() { json!(acc) } else { json!(acc.to_string()) },
        }))
    })
}

#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
