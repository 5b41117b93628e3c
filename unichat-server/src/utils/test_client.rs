use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::message::WebSocketMessage;
use crate::message::chat_request::ChatRequest;
use crate::message::outgoing::error_message::ErrorMessage;
use crate::message::outgoing::{ChatBroadcast, OutgoingMessage};
use futures_channel::mpsc;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;

/// In-process stand-in for a browser's websocket, wired to a server side sender and receiver.
pub struct WebsocketTestClient {
	sender: Pin<Box<dyn Sink<WebSocketMessage, Error = ()> + Unpin + Send>>,
	receiver: Pin<Box<dyn Stream<Item = WebSocketMessage> + Unpin + Send>>,
}

impl WebsocketTestClient {
	pub fn new() -> (MessageSender, MessageReceiver, Self) {
		let (client_sender, server_receiver) = mpsc::unbounded();
		let (server_sender, client_receiver) = mpsc::unbounded();
		let client_sender = client_sender.sink_map_err(|_error| ());

		let message_sender = MessageSender::from(SinkMessageSender::new(server_sender));
		let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(server_receiver, message_sender.clone()));

		let test_client = Self {
			sender: Box::pin(client_sender),
			receiver: Box::pin(client_receiver),
		};

		(message_sender, message_receiver, test_client)
	}

	pub async fn send_raw(&mut self, message: WebSocketMessage) {
		self.sender
			.send(message)
			.await
			.expect("Failed to send message via TestClient.");
	}

	pub async fn send_request(&mut self, request: ChatRequest) {
		self.send_raw(WebSocketMessage::from(&request)).await;
	}

	pub async fn receive_raw(&mut self) -> WebSocketMessage {
		timeout(Duration::from_secs(5), self.receiver.next())
			.await
			.expect("Timed out waiting for message via TestClient")
			.expect("Failed to receive message via TestClient")
	}

	/// Waits until the server ended the conversation, skipping anything still in flight.
	pub async fn wait_for_end(&mut self) -> Vec<WebSocketMessage> {
		let mut remaining = Vec::new();
		while let Ok(Some(message)) = timeout(Duration::from_secs(5), self.receiver.next()).await {
			remaining.push(message);
		}
		remaining
	}

	pub async fn receive_chat_broadcast(&mut self) -> ChatBroadcast {
		match self.receive_outgoing_message().await {
			OutgoingMessage::SendMessage(broadcast) => broadcast,
			message @ OutgoingMessage::Error(_) => panic!("Received message with incorrect type: {message:?}"),
		}
	}

	pub async fn receive_error_message(&mut self) -> ErrorMessage {
		match self.receive_outgoing_message().await {
			OutgoingMessage::Error(error) => error,
			message @ OutgoingMessage::SendMessage(_) => panic!("Received message with incorrect type: {message:?}"),
		}
	}

	async fn receive_outgoing_message(&mut self) -> OutgoingMessage {
		let websocket_message = self.receive_raw().await;
		OutgoingMessage::try_from(&websocket_message).expect("Failed to deserialize OutgoingMessage")
	}

	/// Asserts that nothing arrives within a short grace period.
	pub async fn assert_nothing_received(&mut self) {
		if let Ok(Some(message)) = timeout(Duration::from_millis(100), self.receiver.next()).await {
			panic!("Expected no message, received: {message:?}");
		}
	}
}
