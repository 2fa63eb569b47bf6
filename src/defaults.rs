//! Central place for the binary's default values.
//! Update these and the whole harness picks them up.

pub struct Defaults;

impl Defaults {
    /* Replay */
    pub const REPLAY_INPUT_PATH: &'static str = "./nav_script.json";
    pub const REPLAY_TRACE_PATH: &'static str = "./nav_trace.json";
}
