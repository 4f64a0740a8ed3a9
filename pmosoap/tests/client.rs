use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pmosoap::soap::{SoapFault, build_soap_fault, parse_soap_envelope};
use pmosoap::{
    ClientSettings, OperationCall, Params, RawResponse, SoapClient, SoapError, SoapRequest,
    SoapSession, StaticDefinition, Transport,
};
use serde::Deserialize;
use xmltree::Element;

const TNS: &str = "http://systemsunion.com/connect/webservices/";

/// Transport de test : renvoie toujours la même réponse et garde les requêtes
#[derive(Debug, Clone, Default)]
struct CannedTransport {
    status: u16,
    body: String,
    seen: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl CannedTransport {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            seen: Arc::default(),
        }
    }
}

impl Transport for CannedTransport {
    fn post(&self, request: &SoapRequest<'_>) -> Result<RawResponse, SoapError> {
        self.seen.lock().unwrap().push((
            request.endpoint.to_string(),
            request.soap_action.to_string(),
            String::from_utf8(request.payload.to_vec()).unwrap(),
        ));
        Ok(RawResponse {
            status: self.status,
            body: self.body.clone().into_bytes(),
        })
    }
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="{TNS}">
  <SOAP-ENV:Body>{body}</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

fn client_with(transport: CannedTransport) -> SoapClient {
    let definition = StaticDefinition::new(TNS)
        .with_operation("Execute")
        .with_operation("GetAnswer")
        .with_operation("SecurityProviderAuthenticate");
    SoapClient::new(Arc::new(definition), "http://soap.example.com/connect/soap")
        .unwrap()
        .with_transport(transport)
}

#[derive(Debug, Deserialize, PartialEq)]
struct Answer {
    value: i32,
}

#[test]
fn test_request_round_trip() {
    let client = client_with(CannedTransport::default());
    let call = OperationCall::new(
        "SecurityProviderAuthenticate",
        "SecurityProviderAuthenticateRequest",
        Params::from([("name", "AOK"), ("password", "s3cr&t"), ("domain", "main")]),
    );

    let xml = client.build_request(&call).unwrap();
    let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
    let operation = Element::parse(envelope.body.content.as_slice()).unwrap();

    assert_eq!(operation.name, "SecurityProviderAuthenticateRequest");
    assert_eq!(operation.namespace.as_deref(), Some(TNS));

    let params: Vec<(String, String)> = operation
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .map(|e| {
            (
                e.name.clone(),
                e.get_text().map(|t| t.into_owned()).unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        params,
        vec![
            ("name".to_string(), "AOK".to_string()),
            ("password".to_string(), "s3cr&t".to_string()),
            ("domain".to_string(), "main".to_string()),
        ]
    );
}

#[test]
fn test_fault_takes_precedence() {
    let fault = r#"<SOAP-ENV:Fault><faultcode>Server.InvalidParam</faultcode><faultstring>bad value</faultstring></SOAP-ENV:Fault>"#;
    let client = client_with(CannedTransport::new(500, envelope(fault)));
    let mut session = SoapSession::new(Arc::new(client));

    let err = session
        .invoke("GetAnswer", "", &Params::from([("id", "1")]))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Server.InvalidParam"));
    assert!(message.contains("bad value"));
    assert_eq!(
        err.fault(),
        Some(&SoapFault::new("Server.InvalidParam", "bad value"))
    );

    assert!(matches!(
        session.decode::<Answer>(),
        Err(SoapError::EmptyBody)
    ));
    assert!(matches!(session.extract_text(), Err(SoapError::EmptyBody)));
}

#[test]
fn test_generic_decode_is_idempotent() {
    let client = client_with(CannedTransport::new(
        200,
        envelope("<result><value>42</value></result>"),
    ));
    let mut session = SoapSession::new(Arc::new(client));
    session.invoke("GetAnswer", "", &Params::new()).unwrap();

    let first: Answer = session.decode().unwrap();
    let second: Answer = session.decode().unwrap();
    assert_eq!(first, Answer { value: 42 });
    assert_eq!(first, second);
}

#[test]
fn test_execute_failure_marker() {
    let body = r#"<ns1:ExecuteResponse><ns1:response>&lt;SSC&gt;&lt;Payload status="fail"/&gt;&lt;/SSC&gt;</ns1:response></ns1:ExecuteResponse>"#;
    let client = client_with(CannedTransport::new(200, envelope(body)));

    let response = client
        .invoke("Execute", "ExecuteRequest", &Params::new())
        .unwrap();
    assert!(matches!(
        response.text(),
        Err(SoapError::OperationFailed(_))
    ));
}

#[test]
fn test_execute_journal_number() {
    let body = "<ns1:ExecuteResponse><ns1:response>&amp;lt;JournalNumber&amp;gt;ABC123&amp;lt;/JournalNumber&amp;gt;</ns1:response></ns1:ExecuteResponse>";
    let client = client_with(CannedTransport::new(200, envelope(body)));
    let mut session = SoapSession::new(Arc::new(client));

    session
        .invoke("Execute", "ExecuteRequest", &Params::from([("payload", "<SSC/>")]))
        .unwrap();
    assert_eq!(session.extract_text().unwrap(), "ABC123");
    assert_eq!(session.extract_text().unwrap(), "ABC123");
}

#[test]
fn test_text_filter_only_for_its_operation() {
    let body = "<ns1:GetAnswerResponse><ns1:response>&lt;JournalNumber&gt;7&lt;/JournalNumber&gt;</ns1:response></ns1:GetAnswerResponse>";
    let client = client_with(CannedTransport::new(200, envelope(body)));

    let response = client.invoke("GetAnswer", "", &Params::new()).unwrap();
    assert_eq!(response.text().unwrap(), "<JournalNumber>7</JournalNumber>");
}

#[test]
fn test_session_forgets_result_after_failure() {
    let transport = CannedTransport::new(200, envelope("<result><value>1</value></result>"));
    let client = Arc::new(client_with(transport));
    let mut session = SoapSession::new(client);

    session.invoke("GetAnswer", "", &Params::new()).unwrap();
    assert!(session.last_response().is_some());

    assert!(matches!(
        session.invoke("NotDefined", "", &Params::new()),
        Err(SoapError::UnknownOperation(_))
    ));
    assert!(session.last_response().is_none());
    assert!(matches!(session.decode::<Answer>(), Err(SoapError::EmptyBody)));
}

#[test]
fn test_request_reaches_transport() {
    let transport = CannedTransport::new(200, envelope("<ok/>"));
    let seen = transport.seen.clone();
    let client = client_with(transport);

    client
        .invoke("Execute", "", &Params::from([("a", "1")]))
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (endpoint, action, payload) = &seen[0];
    assert_eq!(endpoint, "http://soap.example.com/connect/soap");
    assert_eq!(action, "http://soap.example.com/connect/soap/Execute");
    assert!(payload.contains("<ns1:Execute xmlns:ns1="));
    assert!(payload.contains("<ns1:a>1</ns1:a>"));
}

#[test]
fn test_malformed_response() {
    let client = client_with(CannedTransport::new(502, "<html>Bad Gateway</html>"));
    assert!(matches!(
        client.invoke("Execute", "", &Params::new()),
        Err(SoapError::Decode(_))
    ));
}

#[test]
fn test_client_is_shareable() {
    let client = Arc::new(client_with(CannedTransport::new(
        200,
        envelope("<result><value>5</value></result>"),
    )));

    thread::scope(|scope| {
        for _ in 0..4 {
            let client = client.clone();
            scope.spawn(move || {
                let response = client.invoke("GetAnswer", "", &Params::new()).unwrap();
                let answer: Answer = response.decode().unwrap();
                assert_eq!(answer.value, 5);
            });
        }
    });
}

#[test]
fn test_unreachable_endpoint() {
    let definition = Arc::new(StaticDefinition::new(TNS).with_operation("Execute"));
    let settings =
        ClientSettings::new("http://127.0.0.1:1/soap").with_timeout(Duration::from_secs(2));

    // La construction ne contacte pas le serveur
    let client = SoapClient::with_settings(definition, &settings).unwrap();

    assert!(matches!(
        client.invoke("Execute", "", &Params::new()),
        Err(SoapError::Transport(_))
    ));
}

/// Serveur HTTP jetable : répond une fois et renvoie la requête reçue
fn one_shot_server(status_line: &'static str, body: String) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/connect/soap", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            lines.push(line);
        }

        let length = lines
            .iter()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);
        let mut payload = vec![0; length];
        reader.read_exact(&mut payload).unwrap();
        lines.push(String::from_utf8(payload).unwrap());

        let mut stream = reader.into_inner();
        write!(
            stream,
            "{status_line}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
        lines
    });

    (endpoint, handle)
}

fn header<'a>(lines: &'a [String], name: &str) -> Option<&'a str> {
    lines.iter().find_map(|l| {
        let (n, v) = l.split_once(':')?;
        n.eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

#[test]
fn test_http_exchange_with_fault_status() {
    let fault = SoapFault::new("SOAP-ENV:Server", "database offline");
    let (endpoint, server) = one_shot_server(
        "HTTP/1.1 500 Internal Server Error",
        build_soap_fault(&fault).unwrap(),
    );

    let definition = Arc::new(StaticDefinition::new(TNS).with_operation("Execute"));
    let client = SoapClient::new(definition, &endpoint).unwrap();

    let err = client
        .invoke("Execute", "ExecuteRequest", &Params::from([("a", "1")]))
        .unwrap_err();
    assert_eq!(err.fault(), Some(&fault));

    let lines = server.join().unwrap();
    assert!(lines[0].starts_with("POST /connect/soap"));
    assert_eq!(
        header(&lines, "Content-Type"),
        Some("text/xml;charset=UTF-8")
    );
    assert_eq!(header(&lines, "Accept"), Some("text/xml"));
    let expected_action = format!("{endpoint}/Execute");
    assert_eq!(header(&lines, "SOAPAction"), Some(expected_action.as_str()));

    let payload = lines.last().unwrap();
    let expected_length = payload.len().to_string();
    assert_eq!(
        header(&lines, "Content-Length"),
        Some(expected_length.as_str())
    );
    assert!(payload.contains("<ns1:ExecuteRequest"));
}

#[test]
fn test_http_exchange_success() {
    let (endpoint, server) = one_shot_server(
        "HTTP/1.1 200 OK",
        envelope("<ns1:GetAnswerResponse><value>42</value></ns1:GetAnswerResponse>"),
    );

    let definition = Arc::new(StaticDefinition::new(TNS).with_operation("GetAnswer"));
    let client = SoapClient::new(definition, &endpoint).unwrap();

    let response = client.invoke("GetAnswer", "", &Params::new()).unwrap();
    server.join().unwrap();

    assert_eq!(response.status(), 200);
    let answer: Answer = response.decode().unwrap();
    assert_eq!(answer.value, 42);
}
