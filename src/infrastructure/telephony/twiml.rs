//! TwiML document builders
//!
//! The telephony provider fetches these markup documents to drive the live
//! call: greet and open the media stream on answer, dial out on transfer.

/// Greeting + bidirectional media stream toward our WebSocket endpoint
pub fn answer_document(ws_url: &str, greeting: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
  <Say voice="Polly.Joanna">{greeting}</Say>
  <Start>
    <Stream url="{ws_url}" />
  </Start>
</Response>"#
    )
}

/// Warm transfer: announce, then dial the acquisitions lead
pub fn transfer_document(caller_id: &str, transfer_number: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
  <Say voice="Polly.Joanna">Connecting you now.</Say>
  <Dial callerId="{caller_id}">{transfer_number}</Dial>
</Response>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_document_embeds_stream_url() {
        let doc = answer_document("wss://example.com/twilio/stream/media", "Hi, this is Vanessa.");
        assert!(doc.contains(r#"<Stream url="wss://example.com/twilio/stream/media" />"#));
        assert!(doc.contains("<Say voice=\"Polly.Joanna\">Hi, this is Vanessa.</Say>"));
    }

    #[test]
    fn test_transfer_document_dials_lead() {
        let doc = transfer_document("+15550001111", "+15552223333");
        assert!(doc.contains(r#"<Dial callerId="+15550001111">+15552223333</Dial>"#));
    }
}
