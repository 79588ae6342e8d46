//! Token hand-off between the web app and the extension.
//!
//! The web client and the extension run in different execution contexts;
//! the token crosses that boundary through a channel abstraction rather
//! than a hardwired browser messaging API. `publish(None)` means the token
//! was cleared (sign-out or forced re-login).

use std::sync::{Arc, Mutex};

use crate::api::ApiClient;

/// Callback invoked on every published token change.
pub type TokenCallback = Box<dyn Fn(Option<&str>) + Send + Sync>;

/// One side of the token hand-off.
pub trait TokenChannel: Send + Sync {
    /// Publish a new token (or its removal) to every subscriber.
    fn publish(&self, token: Option<String>);

    /// Register a callback. It is immediately invoked with the current
    /// value so late subscribers do not miss an already-published token.
    fn subscribe(&self, callback: TokenCallback);
}

/// In-process channel implementation: current value plus a subscriber
/// list. A browser build would satisfy [`TokenChannel`] with its message
/// bus instead.
#[derive(Default)]
pub struct LocalTokenChannel {
    state: Mutex<ChannelState>,
}

#[derive(Default)]
struct ChannelState {
    current: Option<String>,
    subscribers: Vec<TokenCallback>,
}

impl LocalTokenChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenChannel for LocalTokenChannel {
    fn publish(&self, token: Option<String>) {
        let mut state = self.state.lock().expect("channel lock poisoned");
        state.current = token;
        for callback in &state.subscribers {
            callback(state.current.as_deref());
        }
    }

    fn subscribe(&self, callback: TokenCallback) {
        let mut state = self.state.lock().expect("channel lock poisoned");
        callback(state.current.as_deref());
        state.subscribers.push(callback);
    }
}

/// Wire an [`ApiClient`] to a channel so every published token becomes the
/// client's bearer token.
pub fn wire_api_client(channel: &dyn TokenChannel, api: Arc<ApiClient>) {
    channel.subscribe(Box::new(move |token| {
        api.set_token(token.map(str::to_string));
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_subscribers() {
        let channel = LocalTokenChannel::new();
        let seen = Arc::new(Mutex::new(Vec::<Option<String>>::new()));

        let sink = Arc::clone(&seen);
        channel.subscribe(Box::new(move |token| {
            sink.lock().unwrap().push(token.map(str::to_string));
        }));

        channel.publish(Some("tok-1".to_string()));
        channel.publish(None);

        let seen = seen.lock().unwrap();
        // Initial replay of the (empty) current value, then both publishes.
        assert_eq!(*seen, vec![None, Some("tok-1".to_string()), None]);
    }

    #[test]
    fn test_late_subscriber_receives_current_token() {
        let channel = LocalTokenChannel::new();
        channel.publish(Some("existing".to_string()));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        channel.subscribe(Box::new(move |token| {
            assert_eq!(token, Some("existing"));
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wire_api_client_tracks_channel() {
        let channel = LocalTokenChannel::new();
        let api = Arc::new(ApiClient::new("http://localhost:3000"));
        wire_api_client(&channel, Arc::clone(&api));

        channel.publish(Some("tok-2".to_string()));
        assert_eq!(api.token().as_deref(), Some("tok-2"));

        channel.publish(None);
        assert_eq!(api.token(), None);
    }
}
