use crate::message::WebSocketMessage;
use crate::message::outgoing::OutgoingMessage;
use async_trait::async_trait;
use futures_util::{Sink, SinkExt};
use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error};

pub type MessageSender = Pin<Arc<dyn MessageSenderTrait + Send + Sync>>;

#[derive(Debug, thiserror::Error)]
#[error("The connection was closed.")]
pub struct ConnectionClosed;

#[async_trait]
pub trait MessageSenderTrait {
	async fn send_message(&self, message: OutgoingMessage) -> Result<(), ConnectionClosed>;
	async fn send_ping(&self, payload: Vec<u8>) -> Result<(), ConnectionClosed>;
	async fn close(&self);
}

pub struct SinkMessageSender<ResponseSink> {
	response_sink: tokio::sync::Mutex<ResponseSink>,
}

#[async_trait]
impl<ResponseSink, SinkError> MessageSenderTrait for SinkMessageSender<ResponseSink>
where
	ResponseSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + 'static,
{
	async fn send_message(&self, message: OutgoingMessage) -> Result<(), ConnectionClosed> {
		let websocket_message = WebSocketMessage::from(&message);
		self.send(websocket_message).await
	}

	async fn send_ping(&self, payload: Vec<u8>) -> Result<(), ConnectionClosed> {
		self.send(WebSocketMessage::Ping(payload.into())).await
	}

	async fn close(&self) {
		let mut response_sink = self.response_sink.lock().await;
		if let Err(error) = response_sink.send(WebSocketMessage::Close(None)).await {
			debug!(?error, "Failed to send close frame, connection is probably gone already.");
		}
	}
}

impl<ResponseSink, SinkError> SinkMessageSender<ResponseSink>
where
	ResponseSink: Sink<WebSocketMessage, Error = SinkError> + Unpin,
	SinkError: Debug + 'static,
{
	pub fn new(response_sink: ResponseSink) -> Self {
		Self {
			response_sink: response_sink.into(),
		}
	}

	async fn send(&self, websocket_message: WebSocketMessage) -> Result<(), ConnectionClosed> {
		let mut response_sink = self.response_sink.lock().await;
		response_sink.send(websocket_message).await.map_err(|error| {
			error!(?error, "Error while sending frame.");
			ConnectionClosed
		})
	}
}

impl<ResponseSink, SinkError> From<SinkMessageSender<ResponseSink>> for MessageSender
where
	ResponseSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + 'static,
{
	fn from(sink_message_sender: SinkMessageSender<ResponseSink>) -> Self {
		Arc::pin(sink_message_sender)
	}
}
