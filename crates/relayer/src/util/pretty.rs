use core::fmt::{Display, Error as FmtError, Formatter};

use packet_relayer_types::tx_msg::RelayMsg;

/// Renders a list of messages by index and action, eg.
/// `0:update_client,1:recv_packet`.
pub struct PrettyActions<'a>(pub &'a [RelayMsg]);

impl Display for PrettyActions<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        for (i, msg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }

            write!(f, "{}:{}", i, msg.action())?;
        }

        Ok(())
    }
}
