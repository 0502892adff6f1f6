#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use async_snmp::message::Message;

fuzz_target!(|data: &[u8]| {
    // The BER decoder's only entry point from outside the crate is the
    // message envelope: fuzzing it here exercises every decode path
    // (sequence, integer, octet string, OID, NULL, the three exception
    // markers, and each PDU variant) the way a real datagram would.
    let _ = Message::decode(Bytes::copy_from_slice(data));
});
