use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::InstanceId;

/// `window-<unix millis>-<6 hex digits>`. The millisecond part keeps ids from
/// one machine roughly ordered by creation time.
pub fn generate_instance_id() -> InstanceId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::rng().random_range(0..0x100_0000);
    InstanceId::new(format!("window-{}-{:06x}", millis, suffix))
}
