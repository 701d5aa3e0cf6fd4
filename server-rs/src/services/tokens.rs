use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

const HANDLE_BYTES: usize = 32;

/// Opaque, unguessable handle that lets a customer view or cancel a booking.
pub fn cancellation_handle() -> String {
    let mut bytes = [0u8; HANDLE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
