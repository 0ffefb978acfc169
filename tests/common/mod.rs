use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const DATA_PATH: &str = "/data.csv.gz";
pub const STATIONS: [&str; 3] = ["USW00094728", "USC00011084", "CA1AB000001"];
pub const DAYS: u32 = 30;
pub const INVALID_LINES: u64 = 3;

/// Two valid observations per station per day plus a few malformed lines.
pub fn fixture_csv() -> String {
    let mut csv = String::new();
    for day in 1..=DAYS {
        for (i, station) in STATIONS.iter().enumerate() {
            csv.push_str(&format!("{},202401{:02},TMAX,{},,,7,0700\n", station, day, 100 + i as u32));
            csv.push_str(&format!("{},202401{:02},PRCP,{},T,,7,\n", station, day, day));
        }
    }
    csv.push('\n');
    csv.push_str("USW00094728,20240131\n");
    csv.push_str(",20240131,TMAX,5\n");
    csv
}

pub fn valid_lines() -> u64 {
    STATIONS.len() as u64 * DAYS as u64 * 2
}

pub fn gzip(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// Serves one gzip body at `DATA_PATH` for HEAD and GET; every other path is 404.
pub struct FixtureServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    pub async fn serve(body: Vec<u8>) -> Self {
        let app = Router::new()
            .route(DATA_PATH, get(archive_handler).head(archive_head_handler))
            .with_state(Bytes::from(body));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn archive_handler(State(body): State<Bytes>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/gzip")], body)
}

async fn archive_head_handler(State(body): State<Bytes>) -> impl IntoResponse {
    [
        (header::CONTENT_TYPE, "application/gzip".to_string()),
        (header::CONTENT_LENGTH, body.len().to_string()),
    ]
}
