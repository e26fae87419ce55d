use std::io::{self, BufRead, Write};
use std::net::{TcpListener, TcpStream};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use venture_core::{render_report, score, RawVentureInput, Rubric, VentureInput};

use crate::framing::{
    body_len, read_body, read_stdio_frame, write_stdio_frame, FrameError, FrameHeaders,
    StdioFrame,
};
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolsCallParams, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "venture-mcp";

/// Stateless request handler: every call is scored on its own.
pub struct VentureServer {
    rubric: Rubric,
}

impl VentureServer {
    pub fn new() -> Self {
        Self {
            rubric: Rubric::standard(),
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        // Notifications never get a reply, not even an error.
        let Some(id) = request.id else {
            debug!(method = %request.method, "jsonrpc notification");
            return None;
        };

        debug!(method = %request.method, "jsonrpc request");
        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                let message = format!("invalid params: {err}");
                return JsonRpcResponse::error(id, INVALID_PARAMS, message);
            }
        };

        let response = match parsed.name.as_str() {
            "venture_score" => self.exec_venture_score(id, parsed.arguments),
            "venture_rubric" => self.exec_venture_rubric(id),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool"),
        };
        if let Some(err) = &response.error {
            warn!(
                tool = %parsed.name,
                code = err.code,
                message = %err.message,
                "tool call rejected"
            );
        } else {
            debug!(tool = %parsed.name, "tool call completed");
        }
        response
    }

    fn exec_venture_score(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let raw: RawVentureInput = match parse_args_optional(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let input = match VentureInput::try_from(raw) {
            Ok(v) => v,
            Err(err) => return JsonRpcResponse::error(id, INVALID_PARAMS, err.to_string()),
        };

        let assessment = score(&input);
        debug!(
            final_score = assessment.final_score,
            verdict = %assessment.verdict,
            "venture scored"
        );

        JsonRpcResponse::tool_result(
            id,
            render_report(&assessment),
            json!({
                "input": input,
                "assessment": assessment,
                "headline": assessment.verdict.headline(),
                "explanation": assessment.verdict.explanation()
            }),
        )
    }

    fn exec_venture_rubric(&self, id: Value) -> JsonRpcResponse {
        match serde_json::to_value(&self.rubric) {
            Ok(structured) => JsonRpcResponse::tool_result(id, "venture rubric ready", structured),
            Err(err) => {
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("rubric unavailable: {err}"))
            }
        }
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve_stream(stdin.lock(), stdout.lock())
    }

    /// Reads requests until EOF, answering each in the framing it arrived in.
    pub fn serve_stream<R, W>(&self, mut reader: R, mut writer: W) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if StdioFrame::opens_header_block(trimmed) {
                match read_stdio_frame(&mut reader, trimmed) {
                    Ok(body) => (body, StdioFrame::ContentLength),
                    Err(err) => {
                        warn!(%err, "rejected stdio frame");
                        let response = JsonRpcResponse::error(
                            Value::Null,
                            PARSE_ERROR,
                            format!("invalid stdio frame: {err}"),
                        );
                        write_stdio_frame(&mut writer, &response, StdioFrame::ContentLength)?;
                        continue;
                    }
                }
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    let message = format!("parse error: {err}");
                    let response = JsonRpcResponse::error(Value::Null, PARSE_ERROR, message);
                    write_stdio_frame(&mut writer, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_frame(&mut writer, &response, frame)?;
            }
        }

        Ok(())
    }

    pub fn serve_http(&self, addr: &str) -> io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        info!(addr = %listener.local_addr()?, "venture-mcp http listening");
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = self.handle_http_connection(stream) {
                        error!(%err, "http request error");
                    }
                }
                Err(err) => {
                    error!(%err, "http accept error");
                }
            }
        }
        Ok(())
    }

    fn handle_http_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        let mut reader = io::BufReader::new(stream.try_clone()?);
        let response = match read_http_request(&mut reader) {
            Ok(Some(req)) => self.dispatch_http_request(&req),
            Ok(None) => return Ok(()),
            Err(FrameError::Io(err)) => return Err(err),
            Err(err) => {
                warn!(%err, "rejected http request");
                HttpResponse::rejected(&err)
            }
        };
        write_http_response(&mut stream, &response)
    }

    fn dispatch_http_request(&self, req: &HttpRequest) -> HttpResponse {
        debug!(method = %req.method, path = %req.path, "http request");
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/health") => HttpResponse::json(200, &json!({"status": "ok"})),
            ("POST", "/mcp") => self.dispatch_http_rpc(&req.body),
            (_, "/mcp" | "/health") => HttpResponse::json(
                405,
                &json!({"error": "method_not_allowed", "message": "unsupported method for path"}),
            ),
            _ => HttpResponse::json(
                404,
                &json!({"error": "not_found", "message": format!("no route for {}", req.path)}),
            ),
        }
    }

    fn dispatch_http_rpc(&self, body: &[u8]) -> HttpResponse {
        let rpc: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(err) => {
                let response =
                    JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                return HttpResponse::rpc(400, &response);
            }
        };
        match self.handle_request(rpc) {
            Some(response) => HttpResponse::rpc(200, &response),
            None => HttpResponse::empty(204),
        }
    }
}

impl Default for VentureServer {
    fn default() -> Self {
        Self::new()
    }
}

fn tools_list_result() -> Value {
    let kinds = |values: &[&str]| json!({"type": "string", "enum": values});
    json!({
        "tools": [
            {
                "name": "venture_score",
                "description": "Score a business idea on market growth, structural position and unit economics, and return a verdict.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "growth_rate": {"type": "number", "minimum": -10, "maximum": 500},
                        "inevitability": kinds(&["none", "maybe", "mandated"]),
                        "value_chain_position": kinds(&["commodity", "middleman", "aggregator", "ip_owner"]),
                        "asset_intensity": kinds(&["heavy", "medium", "light"]),
                        "price": {"type": "number"},
                        "cogs": {"type": "number"},
                        "cac": {"type": "number"}
                    }
                }
            },
            {
                "name": "venture_rubric",
                "description": "Describe the point tables, weights and verdict thresholds used for scoring.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            }
        ]
    })
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

fn parse_args_optional<T: for<'de> Deserialize<'de> + Default>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    match arguments {
        Some(Value::Null) | None => Ok(T::default()),
        Some(v) => serde_json::from_value(v).map_err(|err| {
            JsonRpcResponse::error(
                Value::Null,
                INVALID_PARAMS,
                format!("invalid tool arguments: {err}"),
            )
        }),
    }
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json(status: u16, value: &Value) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self { status, body }
    }

    fn rpc(status: u16, response: &JsonRpcResponse) -> Self {
        let body = serde_json::to_vec(response).unwrap_or_else(|_| b"{}".to_vec());
        Self { status, body }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    fn rejected(err: &FrameError) -> Self {
        let (status, error) = match err {
            FrameError::TooLarge { .. } => (413, "payload_too_large"),
            _ => (400, "bad_request"),
        };
        Self::json(status, &json!({"error": error, "message": err.to_string()}))
    }
}

/// Request line, headers, then a body of at most [`crate::MAX_BODY_BYTES`].
fn read_http_request<R: BufRead>(reader: &mut R) -> Result<Option<HttpRequest>, FrameError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let request_line = line.trim_end_matches(['\r', '\n']);
    if request_line.is_empty() {
        return Ok(None);
    }

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(FrameError::MalformedRequestLine);
    };
    let method = method.to_string();
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut headers = FrameHeaders::default();
    headers.read_block(reader)?;
    let body = match headers.declared_length()? {
        Some(declared) if declared > 0 => read_body(reader, body_len(declared)?)?,
        _ => Vec::new(),
    };

    Ok(Some(HttpRequest { method, path, body }))
}

fn write_http_response(stream: &mut TcpStream, response: &HttpResponse) -> io::Result<()> {
    let headers = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        http_reason_phrase(response.status),
        response.body.len()
    );
    stream.write_all(headers.as_bytes())?;
    stream.write_all(&response.body)?;
    stream.flush()
}

fn http_reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        _ => "Internal Server Error",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::MAX_BODY_BYTES;

    fn http_status(raw: &str) -> u16 {
        let mut reader = Cursor::new(raw.as_bytes().to_vec());
        match read_http_request(&mut reader) {
            Ok(Some(req)) => VentureServer::new().dispatch_http_request(&req).status,
            Ok(None) => 0,
            Err(err) => HttpResponse::rejected(&err).status,
        }
    }

    #[test]
    fn http_request_keeps_path_and_body() {
        let raw = "POST /mcp?trace=1 HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}";
        let req = read_http_request(&mut Cursor::new(raw.as_bytes().to_vec()))
            .expect("read request")
            .expect("request");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/mcp");
        assert_eq!(req.body, b"{}");
    }

    #[test]
    fn oversized_http_body_is_payload_too_large() {
        let raw = format!(
            "POST /mcp HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_BODY_BYTES + 1
        );
        assert_eq!(http_status(&raw), 413);
        assert_eq!(
            http_status("POST /mcp HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n{}"),
            413
        );
        assert_eq!(http_reason_phrase(413), "Payload Too Large");
    }

    #[test]
    fn malformed_http_framing_is_bad_request() {
        assert_eq!(http_status("POST\r\n\r\n"), 400);
        assert_eq!(
            http_status("POST /mcp HTTP/1.1\r\nContent-Length: lots\r\n\r\n"),
            400
        );
    }

    #[test]
    fn id_less_http_call_is_no_content() {
        let body = r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"venture_score"}}"#;
        let raw = format!(
            "POST /mcp HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        assert_eq!(http_status(&raw), 204);
    }

    #[test]
    fn missing_arguments_use_default_input() {
        let raw: RawVentureInput = parse_args_optional(None).expect("defaults");
        assert_eq!(raw, RawVentureInput::default());
        let raw: RawVentureInput = parse_args_optional(Some(Value::Null)).expect("defaults");
        assert_eq!(raw, RawVentureInput::default());
    }

    #[test]
    fn wrongly_typed_arguments_are_invalid_params() {
        let err = parse_args_optional::<RawVentureInput>(Some(json!({"price": "cheap"})))
            .expect_err("type mismatch");
        assert_eq!(err.error_code(), Some(INVALID_PARAMS));
    }

    #[test]
    fn unknown_route_is_not_found() {
        let server = VentureServer::new();
        let response = server.dispatch_http_request(&HttpRequest {
            method: "GET".to_string(),
            path: "/metrics".to_string(),
            body: Vec::new(),
        });
        assert_eq!(response.status, 404);
    }

    #[test]
    fn wrong_method_on_rpc_path_is_rejected() {
        let server = VentureServer::new();
        let response = server.dispatch_http_request(&HttpRequest {
            method: "GET".to_string(),
            path: "/mcp".to_string(),
            body: Vec::new(),
        });
        assert_eq!(response.status, 405);
    }
}
