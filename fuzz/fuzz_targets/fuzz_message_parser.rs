#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use async_snmp::message::Message;

fuzz_target!(|data: &[u8]| {
    // Fuzz the v1/v2c community message decoder (version, community
    // string, and PDU all in one pass). There is no v3 variant: this
    // crate speaks community-based SNMP only.
    let _ = Message::decode(Bytes::copy_from_slice(data));

    // Truncated datagrams are the most common thing a real socket hands
    // back (short reads, MTU fragmentation); make sure every prefix is
    // also tried rather than only the full buffer.
    for cut in 1..data.len() {
        let _ = Message::decode(Bytes::copy_from_slice(&data[..cut]));
    }
});
