use packet_relayer_types::tx_msg::RelayMsg;

use crate::config::BatchConfig;

/// Split `messages` into the transactions to submit them with.
///
/// Messages keep their order: concatenating the batches gives back the input.
/// A batch is cut before the message that would take it over either bound of
/// `config`. A single message going over a bound on its own is sent alone.
pub fn batch_messages(messages: Vec<RelayMsg>, config: &BatchConfig) -> Vec<Vec<RelayMsg>> {
    let mut batches = vec![];

    let mut current_count = 0;
    let mut current_size = 0;
    let mut current_batch = vec![];

    for message in messages.into_iter() {
        let message_size = message.encoded_len();

        if !current_batch.is_empty()
            && config.exceeded_by(current_count + 1, current_size + message_size)
        {
            batches.push(core::mem::take(&mut current_batch));
            current_count = 0;
            current_size = 0;
        }

        current_count += 1;
        current_size += message_size;
        current_batch.push(message);
    }

    if !current_batch.is_empty() {
        batches.push(current_batch);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::test_utils::{recv_packet_msg, update_client_msg};

    fn messages(n: u64) -> Vec<RelayMsg> {
        let mut msgs = vec![update_client_msg()];
        msgs.extend((1..n).map(recv_packet_msg));
        msgs
    }

    fn sizes(batch: &[RelayMsg]) -> usize {
        batch.iter().map(RelayMsg::encoded_len).sum()
    }

    #[test]
    fn unbounded_is_a_single_batch() {
        let msgs = messages(25);
        let batches = batch_messages(msgs.clone(), &BatchConfig::unbounded());

        assert_eq!(batches, vec![msgs]);
    }

    #[test]
    fn empty_input_has_no_batch() {
        assert!(batch_messages(vec![], &BatchConfig::unbounded()).is_empty());
    }

    #[test]
    fn batches_by_count() {
        let msgs = messages(7);
        let config = BatchConfig {
            max_msg_num: 3,
            max_tx_size: 0,
        };

        let batches = batch_messages(msgs.clone(), &config);

        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![3, 3, 1]
        );
        assert_eq!(batches.concat(), msgs);
    }

    #[test]
    fn batches_by_size() {
        let msgs = messages(10);
        let max_tx_size = msgs[1].encoded_len() * 2 + 1;
        let config = BatchConfig {
            max_msg_num: 0,
            max_tx_size,
        };

        let batches = batch_messages(msgs.clone(), &config);

        assert_eq!(batches.concat(), msgs);

        for batch in &batches {
            assert!(batch.len() == 1 || sizes(batch) <= max_tx_size);
        }
    }

    #[test]
    fn partition_holds_for_any_bounds() {
        let msgs = messages(12);

        for max_msg_num in 0..5 {
            for max_tx_size in [0, 1, 100, 250, 400, 10_000] {
                let config = BatchConfig {
                    max_msg_num,
                    max_tx_size,
                };

                let batches = batch_messages(msgs.clone(), &config);
                assert_eq!(batches.concat(), msgs);

                for batch in &batches {
                    assert!(!batch.is_empty());

                    if batch.len() > 1 {
                        assert!(!config.exceeded_by(batch.len(), sizes(batch)));
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_message_is_sent_alone() {
        let msgs = messages(3);
        let config = BatchConfig {
            max_msg_num: 0,
            max_tx_size: 1,
        };

        let batches = batch_messages(msgs.clone(), &config);

        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|batch| batch.len() == 1));
    }
}
