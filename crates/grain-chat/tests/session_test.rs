use grain_chat::chat_room::{ChatRoom, ChatRoomCall};
use grain_chat::clients::{ChatRoomClient, TickerClient};
use grain_chat::lifecycle::ChatSystem;
use grain_chat::session::{Session, SessionError, SessionSettings};
use grain_chat::ticker::{Ticker, TICKER_ID};
use grain_framework::{ClusterClient, ClusterConnector, GrainClient, InvocationError, SiloConfig};
use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader, ReadBuf};

async fn connect(system: &ChatSystem) -> ClusterClient {
    let gateway = system.gateway();
    gateway.connect(&gateway.endpoint()).await.unwrap()
}

fn room(client: &ClusterClient, channel: &str) -> ChatRoomClient {
    ChatRoomClient::new(client.get_grain::<ChatRoom>(channel.to_string()).unwrap())
}

/// Console that breaks as soon as the session announces a join.
struct BrokenConsole;

impl Write for BrokenConsole {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if String::from_utf8_lossy(buf).contains("Joining") {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "console detached"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Input that fails on every read.
struct BrokenInput;

impl AsyncRead for BrokenInput {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "terminal went away",
        )))
    }
}

async fn run_session(system: &ChatSystem, script: &str) -> (String, ClusterClient) {
    let client = connect(system).await;
    // Separate connection for inspecting the rooms afterwards.
    let observer = connect(system).await;
    let output = Session::new(client, SessionSettings::default(), Vec::new())
        .run(script.as_bytes())
        .await
        .unwrap();
    (String::from_utf8(output).unwrap(), observer)
}

#[tokio::test]
async fn test_interactive_scenario() {
    let system = ChatSystem::start(SiloConfig::default());

    let (output, observer) = run_session(&system, "/j general\nhi\n\n/h\n/l\n/exit\n").await;

    assert!(output.contains("==== CLIENT: Initialized ===="));
    assert!(output.contains("Type '/exit' to exit client."));
    assert!(output.contains("Joining to channel general"));
    assert!(output.contains("====== History for 'general' ======"));
    assert!(output.contains("Alexey> hi"));
    assert!(output.contains("Leaving channel general"));
    assert!(output.contains("==== CLIENT: Shutting down ===="));

    let history = room(&observer, "general").read_history(1000).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "hi");
    assert!(room(&observer, "general").members().await.unwrap().is_empty());
    system.shutdown().await;
}

#[tokio::test]
async fn test_leave_targets_the_named_channel() {
    let system = ChatSystem::start(SiloConfig::default());

    let (output, observer) =
        run_session(&system, "/j random\n/j general\n/l random\n/exit\n").await;

    assert!(output.contains("Leaving channel random"));
    assert!(room(&observer, "random").members().await.unwrap().is_empty());
    assert_eq!(
        room(&observer, "general").members().await.unwrap(),
        vec!["Alexey".to_string()]
    );
    system.shutdown().await;
}

#[tokio::test]
async fn test_messages_go_to_the_current_channel() {
    let system = ChatSystem::start(SiloConfig::default());

    let (_output, observer) = run_session(&system, "before\n/j random\nafter\n").await;

    let texts = |h: Vec<grain_chat::model::ChatMessage>| {
        h.into_iter().map(|m| m.text).collect::<Vec<_>>()
    };
    assert_eq!(
        texts(room(&observer, "general").read_history(10).await.unwrap()),
        vec!["before"]
    );
    assert_eq!(
        texts(room(&observer, "random").read_history(10).await.unwrap()),
        vec!["after"]
    );
    system.shutdown().await;
}

#[tokio::test]
async fn test_session_closes_its_connection_on_end_of_input() {
    let system = ChatSystem::start(SiloConfig::default());
    let client = connect(&system).await;
    let general = room(&client, "general");

    let output = Session::new(client, SessionSettings::default(), Vec::new())
        .run("hello\n".as_bytes())
        .await
        .unwrap();

    assert!(String::from_utf8(output)
        .unwrap()
        .contains("==== CLIENT: Shutting down ===="));
    assert!(matches!(
        general.grain().invoke(ChatRoomCall::Members).await,
        Err(InvocationError::ConnectionClosed)
    ));
    system.shutdown().await;
}

#[tokio::test]
async fn test_usage_errors_do_not_end_the_session() {
    let system = ChatSystem::start(SiloConfig::default());

    let (output, observer) = run_session(&system, "/j\nstill here\n/exit\n").await;

    assert!(output.contains("Usage: /j <channel>"));
    assert_eq!(
        room(&observer, "general").read_history(10).await.unwrap()[0].text,
        "still here"
    );
    system.shutdown().await;
}

#[tokio::test]
async fn test_run_task_issues_one_hundred_ticks() {
    let system = ChatSystem::start(SiloConfig::default());

    let (output, observer) = run_session(&system, "/r\n/exit\n").await;

    assert!(!output.contains("Exception"));
    let ticker = TickerClient::new(observer.get_grain::<Ticker>(TICKER_ID).unwrap());
    assert_eq!(ticker.tick(1).await.unwrap().call_number, 101);
    system.shutdown().await;
}

#[tokio::test]
async fn test_console_write_failure_ends_the_session_and_closes_the_connection() {
    let system = ChatSystem::start(SiloConfig::default());
    let client = connect(&system).await;
    let general = room(&client, "general");

    let result = Session::new(client, SessionSettings::default(), BrokenConsole)
        .run("hi\n/j general\nnever sent\n".as_bytes())
        .await;

    assert!(matches!(result, Err(SessionError::Io(_))));
    assert!(matches!(
        general.grain().invoke(ChatRoomCall::Members).await,
        Err(InvocationError::ConnectionClosed)
    ));
    let observer = connect(&system).await;
    let history = room(&observer, "general").read_history(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "hi");
    system.shutdown().await;
}

#[tokio::test]
async fn test_input_read_failure_ends_the_session_and_closes_the_connection() {
    let system = ChatSystem::start(SiloConfig::default());
    let client = connect(&system).await;
    let general = room(&client, "general");
    let input = BufReader::new("hello\n".as_bytes().chain(BrokenInput));

    let result = Session::new(client, SessionSettings::default(), Vec::new())
        .run(input)
        .await;

    match result {
        Err(SessionError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected a console error, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(
        general.grain().invoke(ChatRoomCall::Members).await,
        Err(InvocationError::ConnectionClosed)
    ));
    let observer = connect(&system).await;
    let history = room(&observer, "general").read_history(10).await.unwrap();
    assert_eq!(history[0].text, "hello");
    system.shutdown().await;
}
