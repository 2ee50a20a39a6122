// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::{frame::coding::CloseCode, CloseFrame};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::run;
use crate::config::{Config, ResolvedConfig};
use crate::driver::Mode;
use crate::error::Error;
use crate::schema::binder::Binder;
use crate::simulator::{SimState, Simulator};
use crate::state::value::{SimMapping, SimValue};
use crate::wire::codec::{decode_simulator_to_server, encode_server_to_simulator};
use crate::wire::descriptor::{Descriptor, FieldDescriptor, FieldType};
use crate::wire::message::{
    AcknowledgeRegisterData, ServerPayload, ServerToSimulator, SimulatorPayload,
};

struct StubSimulator;

impl Simulator for StubSimulator {
    fn get_last_action(&self) -> Option<&SimMapping> {
        None
    }

    fn notify_prediction(&mut self, _prediction: SimMapping) {}

    fn advance(&mut self, _action: &SimMapping) {}

    fn get_state(&self) -> SimState {
        let mut state = SimMapping::new();
        state.insert("a".to_string(), SimValue::Int(1));
        SimState::new(state, false)
    }

    fn reward(&self, _name: &str) -> Option<f64> {
        None
    }
}

fn field(name: &str, number: u32, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor::new(name, number, ty)
}

fn resolved_config_for(url: Url) -> ResolvedConfig {
    let config = Config::parse_from([
        "brainlink",
        "--train-brain",
        "alice",
        "--access-key",
        "my-access-key",
    ]);
    let mut resolved = config.resolve().expect("resolve");
    resolved.url = url;
    resolved
}

#[tokio::test]
async fn happy_path_runs_to_finished_and_flushes_the_recording() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");

        let reg = recv_sim_message(&mut ws).await;
        assert_eq!(reg.payload.kind(), "REGISTER");

        send_server_message(
            &mut ws,
            &ServerToSimulator {
                payload: ServerPayload::AcknowledgeRegister(AcknowledgeRegisterData {
                    sim_id: 1,
                    properties_schema: Descriptor::new("Properties", vec![]),
                    output_schema: Descriptor::new("State", vec![field("a", 1, FieldType::Int32)]),
                    prediction_schema: Descriptor::new(
                        "Prediction",
                        vec![field("b", 1, FieldType::Float32)],
                    ),
                }),
            },
        )
        .await;

        let ready = recv_sim_message(&mut ws).await;
        assert!(matches!(ready.payload, SimulatorPayload::Ready));

        send_server_message(&mut ws, &ServerToSimulator { payload: ServerPayload::Finished }).await;
        let _ = ws.next().await;
    });

    let url = Url::parse(&format!("ws://{addr}/v1/alice/cartpole/sims/ws")).expect("url");
    let mut resolved = resolved_config_for(url);
    let dir = tempfile::tempdir().expect("tempdir");
    let trace_path = dir.path().join("trace.txt");
    resolved.recording_file = Some(trace_path.clone());

    let binder = Arc::new(Binder::new());
    run(resolved, "cartpole", Box::new(StubSimulator), binder, CancellationToken::new())
        .await
        .expect("session run");

    server.await.expect("server task");

    let contents = std::fs::read_to_string(&trace_path).expect("read trace");
    assert!(contents.contains("Register"));
    assert_eq!(contents.lines().last().expect("last line"), "None");
}

#[tokio::test]
async fn abnormal_close_propagates_and_still_flushes_the_recording() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");
        let _reg = recv_sim_message(&mut ws).await;
        ws.send(Message::Close(Some(CloseFrame {
            code: CloseCode::Error,
            reason: "boom".into(),
        })))
        .await
        .expect("send close");
    });

    let url = Url::parse(&format!("ws://{addr}/v1/alice/cartpole/sims/ws")).expect("url");
    let mut resolved = resolved_config_for(url);
    let dir = tempfile::tempdir().expect("tempdir");
    let trace_path = dir.path().join("trace.txt");
    resolved.recording_file = Some(trace_path.clone());

    let binder = Arc::new(Binder::new());
    let err = run(resolved, "cartpole", Box::new(StubSimulator), binder, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Transport(_))));

    server.await.expect("server task");

    let contents = std::fs::read_to_string(&trace_path).expect("read trace");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "RECV");
    assert_eq!(lines[1], "None");
    assert_eq!(lines[2], "SEND");
    assert!(lines[3].contains("Register"));
}

async fn recv_sim_message(ws: &mut WebSocketStream<TcpStream>) -> crate::wire::message::SimulatorToServer {
    match ws.next().await {
        Some(Ok(Message::Binary(bytes))) => decode_simulator_to_server(&bytes).expect("decode"),
        other => panic!("expected binary frame, got {other:?}"),
    }
}

async fn send_server_message(ws: &mut WebSocketStream<TcpStream>, msg: &ServerToSimulator) {
    let bytes = encode_server_to_simulator(msg).to_vec();
    ws.send(Message::Binary(bytes.into())).await.expect("send");
}
