use crate::domain::model::OutgoingMessage;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;

/// 連線、依序寄出全部郵件、最後一定斷線。
///
/// 第一個寄送錯誤會中止剩下的郵件並回傳；已寄出的郵件不會撤回。
/// 斷線失敗只有在寄送全部成功時才回報。
pub async fn deliver<N>(notifier: &mut N, messages: &[OutgoingMessage]) -> Result<usize>
where
    N: Notifier + ?Sized,
{
    notifier.connect().await?;

    let outcome = send_all(notifier, messages).await;
    let closed = notifier.disconnect().await;

    match outcome {
        Ok(sent) => {
            closed?;
            Ok(sent)
        }
        Err(e) => {
            if let Err(close_err) = closed {
                tracing::warn!("Disconnect after failed send also failed: {}", close_err);
            }
            Err(e)
        }
    }
}

async fn send_all<N>(notifier: &mut N, messages: &[OutgoingMessage]) -> Result<usize>
where
    N: Notifier + ?Sized,
{
    let mut sent = 0;
    for message in messages {
        notifier
            .send(&message.to, &message.subject, &message.body)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "❌ Sending to {} failed after {} of {} messages: {}",
                    message.to,
                    sent,
                    messages.len(),
                    e
                )
            })?;
        sent += 1;
    }
    Ok(sent)
}
