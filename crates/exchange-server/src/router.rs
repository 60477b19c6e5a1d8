//! Event routing.
//!
//! Routing policy:
//! - `OrderAdded`, `OrderDeleted`: sent **only** to the originating client.
//! - `OrderExecuted`: broadcast to **all** connected clients, since the
//!   resting side of the trade may belong to another connection.
//!
//! Channels are unbounded, so routing never blocks the caller.

use std::collections::HashMap;

use exchange_core::OutputMessage;
use tracing::debug;

use crate::types::{ClientId, OutboundTx};

/// Route a single `OutputMessage` to the appropriate client(s).
pub fn route_output(
    origin_client: ClientId,
    msg: &OutputMessage,
    clients: &HashMap<ClientId, OutboundTx>,
) {
    match msg {
        OutputMessage::OrderAdded(_) | OutputMessage::OrderDeleted(_) => {
            if let Some(tx) = clients.get(&origin_client) {
                // A closed channel means the client is already going away.
                let _ = tx.send(msg.clone());
            }
        }
        OutputMessage::OrderExecuted(_) => {
            for tx in clients.values() {
                let _ = tx.send(msg.clone());
            }
        }
    }
    debug!(client = origin_client.0, event = ?msg, "event routed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange_core::{OrderDeleted, OrderExecuted};
    use tokio::sync::mpsc;

    #[test]
    fn executions_broadcast_and_deletes_unicast() {
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let clients = HashMap::from([(ClientId(1), tx1), (ClientId(2), tx2)]);

        let deleted = OutputMessage::OrderDeleted(OrderDeleted {
            order_id: 1,
            found: true,
            arrival_ts: 1,
            event_ts: 2,
        });
        let executed = OutputMessage::OrderExecuted(OrderExecuted {
            resting_order_id: 1,
            incoming_order_id: 2,
            fill_seq: 1,
            price: 10,
            quantity: 5,
            arrival_ts: 3,
            event_ts: 4,
        });

        route_output(ClientId(1), &deleted, &clients);
        route_output(ClientId(2), &executed, &clients);

        assert_eq!(rx1.try_recv().ok(), Some(deleted));
        assert_eq!(rx1.try_recv().ok(), Some(executed.clone()));
        assert_eq!(rx2.try_recv().ok(), Some(executed));
        assert!(rx2.try_recv().is_err());
    }
}
