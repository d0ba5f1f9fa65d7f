use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::hub::{MatchSessionRegistry, Push};
use super::protocol::{ClientMsg, ServerMsg};
use crate::domain::actions::{Actor as CommandActor, Command, PlayerAction, SystemInput};
use crate::domain::types::{Millis, UserId};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentUser, MatchId};
use crate::runtime::MatchRegistry;
use crate::state::app_state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// `GET /api/ws/matches/{match_id}`
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    match_id: MatchId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let registry = app_state.registry()?;
    // Fail the upgrade, not the socket, for unknown matches.
    registry.handle(match_id.0).await.map_err(AppError::from)?;

    let session = WsSession {
        conn_id: Uuid::new_v4(),
        match_id: match_id.0,
        user_id: user.id,
        registry,
        sessions: app_state.sessions(),
        token: None,
        last_heartbeat: Instant::now(),
    };
    ws::start(session, &req, stream)
}

/// One participant's socket.
pub struct WsSession {
    conn_id: Uuid,
    match_id: i64,
    user_id: UserId,
    registry: Arc<MatchRegistry>,
    sessions: Arc<MatchSessionRegistry>,
    token: Option<Uuid>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "failed to serialize outbound message"),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    match_id = actor.match_id,
                    user_id = actor.user_id,
                    "websocket heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Presence first, then the full state, so the view already shows the
    /// seat as connected.
    fn announce(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let registry = Arc::clone(&self.registry);
        let (match_id, user_id) = (self.match_id, self.user_id);
        ctx.spawn(
            async move {
                let presence = Command::System(SystemInput::Connected { user_id });
                if let Err(err) = registry.submit(match_id, presence).await {
                    debug!(match_id, user_id, error = %err, "presence not recorded");
                }
                registry.state(match_id).await
            }
            .into_actor(self)
            .map(move |res, actor, ctx| match res {
                Ok(state) => {
                    let seat = state.seat_of(actor.user_id);
                    Self::send_json(ctx, &ServerMsg::state_for(&state, seat));
                }
                Err(err) => {
                    warn!(match_id, error = %err, "initial state unavailable");
                    ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                    ctx.stop();
                }
            }),
        );
    }

    fn submit(
        &self,
        action: PlayerAction,
        client_ts: Option<Millis>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let registry = Arc::clone(&self.registry);
        let match_id = self.match_id;
        let command = Command::Act {
            actor: CommandActor::User {
                user_id: self.user_id,
            },
            action,
            client_ts,
        };
        ctx.spawn(
            async move { registry.submit(match_id, command).await }
                .into_actor(self)
                .map(|res, _actor, ctx| {
                    let reply = match res {
                        Ok(accepted) => ServerMsg::Ack {
                            seq: accepted.last_seq,
                        },
                        Err(err) => ServerMsg::rejected(&AppError::from(err)),
                    };
                    Self::send_json(ctx, &reply);
                }),
        );
    }

    fn resync(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let registry = Arc::clone(&self.registry);
        let match_id = self.match_id;
        ctx.spawn(
            async move { registry.state(match_id).await }
                .into_actor(self)
                .map(|res, actor, ctx| match res {
                    Ok(state) => {
                        let seat = state.seat_of(actor.user_id);
                        Self::send_json(ctx, &ServerMsg::state_for(&state, seat));
                    }
                    Err(err) => Self::send_json(ctx, &ServerMsg::rejected(&AppError::from(err))),
                }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            match_id = self.match_id,
            user_id = self.user_id,
            "websocket session started"
        );
        let recipient = ctx.address().recipient::<Push>();
        self.token = Some(self.sessions.register(self.match_id, self.user_id, recipient));
        self.start_heartbeat(ctx);
        self.announce(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(token) = self.token.take() {
            self.sessions.unregister(self.match_id, token);
        }
        let registry = Arc::clone(&self.registry);
        let (match_id, user_id) = (self.match_id, self.user_id);
        actix_web::rt::spawn(async move {
            let presence = Command::System(SystemInput::Disconnected { user_id });
            if let Err(err) = registry.submit(match_id, presence).await {
                debug!(match_id, user_id, error = %err, "disconnect not recorded");
            }
        });
        info!(
            conn_id = %self.conn_id,
            match_id = self.match_id,
            user_id = self.user_id,
            "websocket session stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Submit { action, client_ts }) => {
                        self.submit(action, client_ts, ctx)
                    }
                    Ok(ClientMsg::Resync) => self.resync(ctx),
                    Ok(ClientMsg::Ping) => Self::send_json(ctx, &ServerMsg::Pong),
                    Err(err) => {
                        debug!(conn_id = %self.conn_id, error = %err, "malformed client message");
                        Self::send_json(
                            ctx,
                            &ServerMsg::rejected(&AppError::invalid(
                                ErrorCode::ValidationFailed,
                                "Malformed message",
                            )),
                        );
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                Self::send_json(
                    ctx,
                    &ServerMsg::rejected(&AppError::bad_request(
                        ErrorCode::BadRequest,
                        "Binary frames are not supported",
                    )),
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    match_id = self.match_id,
                    error = %err,
                    "websocket protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Push> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Push, ctx: &mut Self::Context) {
        for out in msg.0.iter() {
            Self::send_json(ctx, out);
        }
    }
}
