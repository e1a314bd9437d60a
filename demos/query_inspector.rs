use retro_http::{Handler, Request, Response, Server, StatusCode, NO_HEADERS};
use tokio::net::TcpListener;

struct Inspector;

impl Handler for Inspector {
    async fn handle(&self, req: &mut Request) -> Response {
        let mut text = format!("{} {}\n", req.method().as_str(), req.target().path());

        for (key, value) in req.target().query_params() {
            text.push_str(&format!("query {key:?} = {value:?}\n"));
        }
        for (name, value) in req.headers() {
            text.push_str(&format!("header {name:?} = {value:?}\n"));
        }

        Response::build(
            req.protocol(),
            StatusCode::Ok,
            None,
            [("Content-Type", "text/plain"), ("Content-Length", &text.len().to_string())],
            text,
        )
    }
}

#[tokio::main]
async fn main() {
    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8008").await.unwrap())
        .handler(Inspector)
        .build()
        .launch()
        .await;
}
