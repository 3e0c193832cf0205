use smsgw_core::MessageId;

/// Public address of this gateway, used to build the callback URLs handed to
/// providers.
///
/// The URL shape `{scheme}://{host}:{port}/{provider}/report/{message_id}`
/// is the only join key between a send and its delivery reports, so it must
/// stay stable.
#[derive(Debug, Clone)]
pub struct CallbackHost {
    scheme: String,
    host: String,
    port: u16,
}

impl CallbackHost {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Callback URL for one message through one provider.
    ///
    /// ```
    /// use smsgw_core::MessageId;
    /// use smsgw_dispatch::CallbackHost;
    ///
    /// let host = CallbackHost::new("https", "gw.example.com", 9191);
    /// assert_eq!(
    ///     host.report_url("infobip", MessageId(42)),
    ///     "https://gw.example.com:9191/infobip/report/42"
    /// );
    /// ```
    pub fn report_url(&self, provider: &str, message_id: MessageId) -> String {
        format!(
            "{}://{}:{}/{}/report/{}",
            self.scheme, self.host, self.port, provider, message_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_url_is_stable() {
        let host = CallbackHost::new("http", "localhost", 8080);
        assert_eq!(
            host.report_url("telerivet", MessageId(7)),
            "http://localhost:8080/telerivet/report/7"
        );
    }
}
