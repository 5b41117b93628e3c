use crate::connection::sender::MessageSender;
use crate::message::chat_request::ChatRequest;
use crate::message::{MessageError, WebSocketMessage};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;

pub type MessageReceiver = Pin<Box<dyn MessageReceiverTrait + Unpin + Send>>;

#[derive(Debug)]
pub enum ReceivedMessage {
	Request(ChatRequest),
	/// A frame that couldn't be understood. The connection stays usable.
	Malformed(MessageError),
	Pong {
		payload: Vec<u8>,
	},
	Finished,
}

#[async_trait]
pub trait MessageReceiverTrait {
	/// Receive the next frame from the client, `Finished` once the connection has been closed.
	async fn receive(&mut self) -> ReceivedMessage;
}

pub struct StreamMessageReceiver<RequestStream> {
	request_stream: RequestStream,
	message_sender: MessageSender,
}

#[async_trait]
impl<RequestStream> MessageReceiverTrait for StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send,
{
	async fn receive(&mut self) -> ReceivedMessage {
		loop {
			let Some(websocket_message) = self.request_stream.next().await else {
				return ReceivedMessage::Finished;
			};

			return match websocket_message {
				WebSocketMessage::Close(_) => {
					self.message_sender.close().await;
					ReceivedMessage::Finished
				}
				// answered by the websocket implementation
				WebSocketMessage::Ping(_) => continue,
				WebSocketMessage::Pong(payload) => ReceivedMessage::Pong {
					payload: payload.to_vec(),
				},
				websocket_message => match ChatRequest::try_from(&websocket_message) {
					Ok(request) => ReceivedMessage::Request(request),
					Err(error) => ReceivedMessage::Malformed(error),
				},
			};
		}
	}
}

impl<RequestStream> StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage>,
{
	pub fn new(request_stream: RequestStream, message_sender: MessageSender) -> Self {
		Self {
			request_stream,
			message_sender,
		}
	}
}

impl<RequestStream> From<StreamMessageReceiver<RequestStream>> for MessageReceiver
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send + 'static,
{
	fn from(stream_message_receiver: StreamMessageReceiver<RequestStream>) -> Self {
		Box::pin(stream_message_receiver)
	}
}
