//! Camera discovery.
//!
//! | Step | What happens |
//! |------|--------------|
//! | Probe | Each index `0..max_devices` is checked for a device node, opened and test-read |
//! | Classify | The device name is matched against external/integrated keyword lists |
//! | Order | External > Unknown (index > 0) > Integrated > Unknown (index 0) |

pub mod classify;
pub mod probe;
pub mod selector;

pub use classify::{classify, classify_with, ClassRule, DEFAULT_RULES};
pub use probe::{DeviceProbe, ProbeInfo, SystemProbe};
pub use selector::{order_candidates, CameraSelector, DEFAULT_MAX_DEVICES};
