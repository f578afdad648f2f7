use std::net::SocketAddr;
use std::time::Duration;

use mq_exporter::app::App;
use mq_exporter::error::Error;
use mq_exporter::infrastructure::config::settings::Config;
use mq_exporter::port::{MqReturn, ReasonCode};
use mq_exporter::testkit::config::mq;
use mq_exporter::testkit::transport::{QueueValues, ScriptedTransport};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Running {
    address: SocketAddr,
    stop: watch::Sender<bool>,
    server: JoinHandle<mq_exporter::error::Result<()>>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    async fn shutdown(self) -> mq_exporter::error::Result<()> {
        let _ = self.stop.send(true);
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("server stopped")
            .expect("join")
    }
}

fn config(queues: &[&str]) -> Config {
    let mut config = Config::parse_toml(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"
"#,
    )
    .expect("config");
    config.mq = mq(queues);
    config
}

async fn start(config: Config, transport: ScriptedTransport) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    let (stop, shutdown) = watch::channel(false);
    let server = tokio::spawn(App::serve(config, transport, listener, shutdown));
    Running {
        address,
        stop,
        server,
    }
}

async fn get(url: &str) -> (u16, String, String) {
    for _ in 0..50 {
        match reqwest::get(url).await {
            Ok(response) => {
                let status = response.status().as_u16();
                let content_type = response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let body = response.text().await.expect("body");
                return (status, content_type, body);
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    panic!("server at {url} never answered");
}

#[tokio::test]
async fn metrics_endpoint_serves_queue_gauges() {
    let transport = ScriptedTransport::new();
    transport.set_values(
        "DEV.QUEUE.1",
        QueueValues {
            current_depth: 3,
            max_depth: 5000,
            ..QueueValues::default()
        },
    );
    let running = start(config(&["DEV.QUEUE.1"]), transport.clone()).await;

    let (status, content_type, body) = get(&running.url("/metrics")).await;
    assert_eq!(status, 200);
    assert!(content_type.starts_with("text/plain"));
    assert!(body.contains(
        r#"mq_queue_current_depth{channel="DEV.APP.SVRCONN",connection="localhost(1414)",name="DEV.QUEUE.1",queue_manager="QM1"} 3"#
    ));
    assert!(body.contains("mq_queue_max_depth{"));
    assert!(body.contains(r#"promhttp_metric_handler_requests_total{code="200"} 0"#));

    let (_, _, second) = get(&running.url("/metrics")).await;
    assert!(second.contains(r#"promhttp_metric_handler_requests_total{code="200"} 1"#));

    running.shutdown().await.expect("clean shutdown");
    assert_eq!(transport.disconnect_count(), 1);
    assert_eq!(transport.open_handles(), 0);
}

#[tokio::test]
async fn metrics_endpoint_serves_handler_metrics() {
    let running = start(config(&["DEV.QUEUE.1"]), ScriptedTransport::new()).await;

    let (status, _, body) = get(&running.url("/metrics")).await;
    assert_eq!(status, 200);
    assert!(body.contains("# TYPE promhttp_metric_handler_requests_in_flight gauge\n"));
    assert!(body.contains("promhttp_metric_handler_requests_in_flight 1\n"));
    for code in ["200", "500", "503"] {
        assert!(body.contains(&format!(
            "promhttp_metric_handler_requests_total{{code=\"{code}\"}} 0\n"
        )));
    }

    running.shutdown().await.expect("clean shutdown");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn metrics_endpoint_serves_process_metrics() {
    let running = start(config(&["DEV.QUEUE.1"]), ScriptedTransport::new()).await;

    let (status, _, body) = get(&running.url("/metrics")).await;
    assert_eq!(status, 200);
    assert!(body.contains("# TYPE process_cpu_seconds_total counter\n"));
    assert!(body.contains("process_resident_memory_bytes "));
    assert!(body.contains("process_start_time_seconds "));
    assert!(body.contains("process_open_fds "));

    running.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn custom_telemetry_path_and_landing_page() {
    let mut config = config(&["DEV.QUEUE.1"]);
    config.web.telemetry_path = "/mq/metrics".into();
    let running = start(config, ScriptedTransport::new()).await;

    let (status, _, body) = get(&running.url("/")).await;
    assert_eq!(status, 200);
    assert!(body.contains("<a href=\"/mq/metrics\">Metrics</a>"));

    let (status, _, body) = get(&running.url("/mq/metrics")).await;
    assert_eq!(status, 200);
    assert!(body.contains("mq_queue_up{"));

    let (status, _, _) = get(&running.url("/metrics")).await;
    assert_eq!(status, 404);

    running.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn serve_fails_when_initial_connect_fails() {
    let transport = ScriptedTransport::new().with_connect_results(vec![Err(MqReturn::failed(
        ReasonCode::Q_MGR_NOT_AVAILABLE,
    ))]);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let (_stop, shutdown) = watch::channel(false);

    let result = App::serve(config(&["DEV.QUEUE.1"]), transport, listener, shutdown).await;
    assert!(matches!(result, Err(Error::Connection(_))));
}
