//! Logger facade owning the resolved configuration.
//!
//! The facade ties the pipeline together: record assembly, redaction,
//! level gating, and delivery. A process-wide instance is initialised
//! lazily on first use (first caller wins) so call sites can use the
//! static [`Logger::log`] without plumbing a handle around, mirroring
//! how the embedding application configures the shipper once at
//! startup.

use std::panic;
use std::sync::Once;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::config::Config;
use crate::context::{ContextProvider, StaticContext};
use crate::delivery::{DeliveryClient, DeliveryError};
use crate::record::RecordBuilder;
use crate::redact::Redactor;
use crate::severity::{self, Severity};

/// Component-label prefix for records produced by the error hook.
pub const ERROR_COMPONENT_PREFIX: &str = "Logger/Error/";

static GLOBAL: OnceCell<Logger> = OnceCell::new();

/// Facade over the record construction and delivery pipeline.
pub struct Logger {
    config: Config,
    redactor: Redactor,
    client: DeliveryClient,
    context: Box<dyn ContextProvider>,
}

impl Logger {
    /// Build a logger from a resolved configuration and the host's
    /// ambient context provider.
    pub fn new(config: Config, context: impl ContextProvider + 'static) -> Self {
        let redactor = match &config.sensitive_keys {
            Some(keys) => Redactor::with_keys(keys.clone()),
            None => Redactor::new(),
        };
        Self {
            config,
            redactor,
            client: DeliveryClient::new(),
            context: Box::new(context),
        }
    }

    /// Install `logger` as the process-wide instance.
    ///
    /// First caller wins; a logger already installed (including one
    /// created lazily by [`Logger::global`]) is kept and returned.
    pub fn init(logger: Logger) -> &'static Logger {
        GLOBAL.get_or_init(move || logger)
    }

    /// The process-wide instance, created from the environment on
    /// first use when [`Logger::init`] was never called.
    pub fn global() -> &'static Logger {
        GLOBAL.get_or_init(|| Logger::new(Config::from_env(), StaticContext::default()))
    }

    /// The resolved configuration this logger runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ship `payload` through the process-wide instance.
    ///
    /// Convenience entry point equivalent to
    /// `Logger::global().log_data(..)`.
    pub fn log(
        payload: impl Serialize,
        component: Option<&str>,
        include_page_info: bool,
    ) -> Result<(), DeliveryError> {
        Self::global().log_data(payload, component, include_page_info)
    }

    /// Assemble a record from `payload` and deliver it, blocking until
    /// the exchange completes or fails. Each call ships at most one
    /// record; there is no retry.
    pub fn log_data(
        &self,
        payload: impl Serialize,
        component: Option<&str>,
        include_page_info: bool,
    ) -> Result<(), DeliveryError> {
        let data = serde_json::to_value(payload)?;
        let record = self.builder().build(data, component, include_page_info);
        self.client.deliver(&self.config, &record)
    }

    /// Convert a runtime error event into a log record and ship it.
    ///
    /// The record's payload is the enriched page-info snapshot: the
    /// composite `"<NAME> | <message> | <file>:<line>"` line plus, for
    /// fatal errors only, the redacted parameter snapshots. Never
    /// panics and never reports failure to the caller; a failed
    /// shipment is noted through the `log` crate and swallowed.
    pub fn handle_runtime_error(&self, code: u32, message: &str, file: &str, line: u32) {
        let name = severity::stringify(code);
        let info = self.builder().error_page_info(name, message, file, line);
        let component = format!("{ERROR_COMPONENT_PREFIX}{name}");
        if let Err(err) = self.log_data(&info, Some(&component), false)
            && !err.is_suppression()
        {
            log::warn!("logship: runtime error event not shipped: {err}");
        }
    }

    /// Install a panic hook routing panics through
    /// [`Logger::handle_runtime_error`] at the fatal-error severity.
    ///
    /// Explicit opt-in: a no-op unless the configuration enables the
    /// error handler. The previous hook keeps running afterwards, so
    /// default panic output is preserved. Installed at most once per
    /// process.
    pub fn register_error_handler(&'static self) {
        if !self.config.error_handler {
            return;
        }
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |panic_info| {
                let message = panic_message(panic_info);
                let (file, line) = panic_info
                    .location()
                    .map(|loc| (loc.file().to_string(), loc.line()))
                    .unwrap_or_default();
                self.handle_runtime_error(Severity::Error.code(), &message, &file, line);
                previous(panic_info);
            }));
        });
    }

    fn builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self.context.as_ref(), &self.redactor)
    }
}

fn panic_message(panic_info: &panic::PanicHookInfo<'_>) -> String {
    if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, mpsc};
    use std::thread;
    use std::time::Duration;

    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use serial_test::serial;

    use super::*;
    use crate::context::RequestSnapshot;
    use crate::delivery::ACK_BODY;

    /// Serve one request, answer with the acknowledgement, forward the
    /// captured body.
    fn spawn_ack_endpoint(listener: TcpListener) -> (SocketAddr, mpsc::Receiver<String>) {
        let addr = listener.local_addr().expect("listener address");
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header line");
                let line = line.trim();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':')
                    && key.trim().eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
            let mut body = vec![0u8; content_length];
            if content_length > 0 {
                reader.read_exact(&mut body).expect("body");
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{ACK_BODY}",
                ACK_BODY.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(String::from_utf8_lossy(&body).to_string());
        });
        (addr, rx)
    }

    #[fixture]
    fn tcp_listener() -> TcpListener {
        TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
    }

    fn logger_for(addr: SocketAddr) -> Logger {
        let config = Config::builder()
            .with_destination(format!("http://{addr}/ingest"))
            .build();
        let context = StaticContext::new("https://blog.example.org").with_request(
            RequestSnapshot {
                scheme: "https".into(),
                host: "blog.example.org".into(),
                uri: "/checkout".into(),
                get_params: BTreeMap::from([("coupon".into(), "x1".into())]),
                post_params: BTreeMap::from([
                    ("card".into(), "4111".into()),
                    ("password".into(), "hunter2".into()),
                ]),
                is_ajax: true,
                is_cron: false,
                is_rest: false,
            },
        );
        Logger::new(config, context)
    }

    fn shipped_body(rx: &mpsc::Receiver<String>) -> Value {
        let body = rx.recv_timeout(Duration::from_secs(5)).expect("request");
        serde_json::from_str(&body).expect("json body")
    }

    #[rstest]
    #[serial]
    fn log_data_ships_a_record_with_page_info(tcp_listener: TcpListener) {
        crate::redact::clear_sensitive_key_filter();
        let (addr, rx) = spawn_ack_endpoint(tcp_listener);
        logger_for(addr)
            .log_data(json!({"step": "capture"}), Some("checkout"), true)
            .expect("delivery should succeed");

        let wire = shipped_body(&rx);
        assert_eq!(wire["component"], "checkout");
        assert_eq!(wire["data"]["step"], "capture");
        assert_eq!(wire["page_info"]["url"], "https://blog.example.org/checkout");
        assert_eq!(wire["page_info"]["is_ajax"], true);
        assert_eq!(wire["page_info"]["post"]["card"], "4111");
        assert!(wire["page_info"]["post"].get("password").is_none());
    }

    #[rstest]
    #[serial]
    fn fatal_runtime_error_keeps_parameter_snapshots(tcp_listener: TcpListener) {
        crate::redact::clear_sensitive_key_filter();
        let (addr, rx) = spawn_ack_endpoint(tcp_listener);
        logger_for(addr).handle_runtime_error(Severity::Error.code(), "boom", "a.php", 42);

        let wire = shipped_body(&rx);
        assert_eq!(wire["component"], "Logger/Error/E_ERROR");
        assert_eq!(wire["data"]["error"], "E_ERROR | boom | a.php:42");
        assert_eq!(wire["data"]["get"]["coupon"], "x1");
        assert!(wire["data"]["post"].get("password").is_none());
        assert!(wire.get("page_info").is_none());
    }

    #[rstest]
    #[serial]
    fn non_fatal_runtime_error_drops_parameter_snapshots(tcp_listener: TcpListener) {
        crate::redact::clear_sensitive_key_filter();
        let (addr, rx) = spawn_ack_endpoint(tcp_listener);
        logger_for(addr).handle_runtime_error(
            Severity::Deprecated.code(),
            "old api",
            "b.php",
            7,
        );

        let wire = shipped_body(&rx);
        assert_eq!(wire["component"], "Logger/Error/E_DEPRECATED");
        assert_eq!(wire["data"]["error"], "E_DEPRECATED | old api | b.php:7");
        assert!(wire["data"].get("get").is_none());
        assert!(wire["data"].get("post").is_none());
    }

    #[test]
    fn runtime_error_hook_swallows_delivery_failures() {
        // Default destination still carries the placeholder, so the
        // shipment fails; the hook must not propagate that.
        let logger = Logger::new(Config::builder().build(), StaticContext::default());
        logger.handle_runtime_error(Severity::Warning.code(), "odd", "c.rs", 3);
    }

    #[rstest]
    #[serial]
    fn configured_sensitive_keys_replace_the_default_list(tcp_listener: TcpListener) {
        crate::redact::clear_sensitive_key_filter();
        let (addr, rx) = spawn_ack_endpoint(tcp_listener);
        let config = Config::builder()
            .with_destination(format!("http://{addr}/ingest"))
            .with_sensitive_keys(vec!["card".to_string()])
            .build();
        let context = StaticContext::new("https://blog.example.org").with_request(
            RequestSnapshot {
                scheme: "https".into(),
                host: "blog.example.org".into(),
                uri: "/checkout".into(),
                get_params: BTreeMap::new(),
                post_params: BTreeMap::from([
                    ("card".into(), "4111".into()),
                    ("password".into(), "hunter2".into()),
                ]),
                is_ajax: false,
                is_cron: false,
                is_rest: false,
            },
        );
        Logger::new(config, context)
            .log_data(json!("audit"), None, true)
            .expect("delivery should succeed");

        let wire = shipped_body(&rx);
        assert!(wire["page_info"]["post"].get("card").is_none());
        assert_eq!(wire["page_info"]["post"]["password"], "hunter2");
    }

    // The process-wide instance and the panic hook are both installed
    // at most once per process, so every assertion about them lives in
    // this single test.
    #[rstest]
    #[serial]
    fn global_install_is_first_wins_and_panics_ship_at_fatal_severity(
        tcp_listener: TcpListener,
    ) {
        crate::redact::clear_sensitive_key_filter();
        let (addr, rx) = spawn_ack_endpoint(tcp_listener);
        let first = Logger::init(Logger::new(
            Config::builder()
                .with_destination(format!("http://{addr}/ingest"))
                .with_error_handler(true)
                .build(),
            StaticContext::new("https://one.example.org"),
        ));
        let second = Logger::init(Logger::new(
            Config::builder().with_token("tok-2").build(),
            StaticContext::new("https://two.example.org"),
        ));
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, Logger::global()));
        assert!(first.config().error_handler);

        let chained = Arc::new(AtomicBool::new(false));
        let chained_flag = Arc::clone(&chained);
        panic::set_hook(Box::new(move |_| {
            chained_flag.store(true, Ordering::SeqCst);
        }));
        first.register_error_handler();

        let unwound = panic::catch_unwind(|| panic!("boom"));
        assert!(unwound.is_err());

        let wire = shipped_body(&rx);
        assert_eq!(wire["component"], "Logger/Error/E_ERROR");
        let line = wire["data"]["error"].as_str().expect("error line");
        assert!(line.starts_with("E_ERROR | boom | "));
        assert_eq!(wire["url"], "one.example.org");
        // The hook that was installed before ours must keep running.
        assert!(chained.load(Ordering::SeqCst));
    }
}
