pub mod countdown;
pub mod sequencer;
pub mod source;
