use hdlc_link::{
    reassemble, Control, Decoded, FrameCategory, HdlcAddress, HdlcError, HdlcFrame,
    HdlcParameters, HdlcStreamDecoder, LinkConfig, LlcPdu,
};
use std::collections::VecDeque;

fn client() -> HdlcAddress {
    HdlcAddress::encode(0x10, None).unwrap()
}

fn server() -> HdlcAddress {
    HdlcAddress::encode(0x01, None).unwrap()
}

fn information_frame() -> HdlcFrame {
    HdlcFrame::information(server(), client(), 0, 0, true, &[0x01, 0x02, 0x03, 0x04], false)
        .unwrap()
}

#[test]
fn empty_info_snrm() {
    let frame = HdlcFrame::new(server(), client(), Control::SNRM, &[], false).unwrap();
    let wire = frame.encode();
    assert_eq!(wire, vec![0x7E, 0xA0, 0x07, 0x03, 0x21, 0x93, 0x0F, 0x01, 0x7E]);

    let (decoded, used) = HdlcFrame::decode(&wire).unwrap();
    assert_eq!(used, wire.len());
    assert_eq!(decoded.control().category(), FrameCategory::Unnumbered);
    assert!(decoded.information_field().is_empty());
    assert!(!decoded.is_segmented());
    assert_eq!(decoded.hcs(), None);
}

#[test]
fn ua_with_negotiation() {
    let mut parameters = HdlcParameters::default();
    parameters
        .set_from_ua(&[0x81, 0x80, 0x03, 0x06, 0x01, 0xC9])
        .unwrap();

    assert_eq!(parameters.max_information_field_length_tx, 201);
    assert_eq!(parameters.max_information_field_length_rx, 128);
    assert_eq!(parameters.window_size_tx, 1);
    assert_eq!(parameters.window_size_rx, 1);
    assert_eq!(parameters.encode_snrm(), vec![0x81, 0x80, 0x03, 0x05, 0x01, 0xC9]);
}

#[test]
fn ua_frame_from_the_wire() {
    let wire = [
        0x7E, 0xA0, 0x0F, 0x21, 0x03, 0x73, 0xD9, 0xA5, 0x81, 0x80, 0x03, 0x06, 0x01, 0xC9,
        0xAE, 0xB9, 0x7E,
    ];
    let mut decoder = HdlcStreamDecoder::new();
    decoder.push_bytes(&wire);
    let frame = decoder.next_frame().unwrap();
    assert_eq!(frame.control(), Control::UA);

    let parameters = HdlcParameters::from_ua(frame.information_field()).unwrap();
    assert_eq!(parameters.max_information_field_length_tx, 201);
}

#[test]
fn four_octet_address() {
    let (address, used) = HdlcAddress::parse(&[0x04, 0x00, 0x00, 0x21]).unwrap();
    assert_eq!(used, 4);
    assert_eq!(address.upper(), 256);
    assert_eq!(address.lower(), Some(16));

    let encoded = HdlcAddress::encode(256, Some(16)).unwrap();
    assert_eq!(encoded.octets(), &[0x04, 0x00, 0x00, 0x21]);
    assert_eq!(encoded, address);
}

#[test]
fn segmented_information_reassembly() {
    let first =
        HdlcFrame::new(server(), client(), Control::from_octet(0x10), &[0xAA, 0xBB], true)
            .unwrap();
    let last = HdlcFrame::new(server(), client(), Control::from_octet(0x32), &[0xCC], false)
        .unwrap();

    // Through the wire and back
    let mut decoder = HdlcStreamDecoder::new();
    decoder.push_bytes(&first.encode());
    decoder.push_bytes(&last.encode());
    let mut queue: VecDeque<HdlcFrame> = decoder.drain_frames().into();
    assert_eq!(queue.len(), 2);

    assert_eq!(reassemble(&mut queue).unwrap(), vec![0xAA, 0xBB, 0xCC]);
    assert!(queue.is_empty());
}

#[test]
fn bad_crc_discarded() {
    let good = information_frame().encode();
    let mut bad = good.clone();
    // inside the information field
    bad[9] ^= 0xFF;

    let mut decoder = HdlcStreamDecoder::new();
    decoder.push_bytes(&bad);
    assert!(matches!(
        decoder.poll(),
        Decoded::Discarded(HdlcError::CrcError { .. })
    ));
    assert_eq!(decoder.next_frame(), None);
    // only the closing flag is left, it may open the next frame
    assert_eq!(decoder.buffered(), &[0x7E]);

    decoder.push_bytes(&good);
    assert_eq!(decoder.next_frame(), Some(information_frame()));
    assert!(decoder.buffered().is_empty());
    assert_eq!(decoder.statistics().fcs_errors, 1);

    decoder.push_bytes(&bad);
    decoder.push_bytes(&good[1..]);
    assert_eq!(decoder.drain_frames(), vec![information_frame()]);
}

#[test]
fn bad_crc_followed_by_concatenated_frame() {
    let good = information_frame().encode();
    let mut stream = good.clone();
    stream[10] ^= 0x01;
    stream.extend_from_slice(&good);

    let mut decoder = HdlcStreamDecoder::new();
    decoder.push_bytes(&stream);
    assert_eq!(decoder.drain_frames(), vec![information_frame()]);
    assert!(decoder.buffered().is_empty());
}

#[test]
fn type_nibble_mismatch_resync() {
    let good = information_frame().encode();
    let mut stream = vec![0x7E, 0x00, 0x00];
    stream.extend_from_slice(&good);

    let mut decoder = HdlcStreamDecoder::new();
    decoder.push_bytes(&stream);
    let frame = decoder.next_frame().unwrap();
    assert_eq!(frame, information_frame());
    assert_eq!(frame.information_field(), &[0x01, 0x02, 0x03, 0x04]);
    assert!(decoder.buffered().is_empty());
    assert_eq!(decoder.statistics().format_errors, 1);
}

#[test]
fn garbage_prefix_resync() {
    let good = information_frame().encode();
    let mut stream = vec![0x00, 0xFF, 0xA0, 0x13, 0x37];
    stream.extend_from_slice(&good);

    let mut decoder = HdlcStreamDecoder::new();
    for chunk in stream.chunks(3) {
        decoder.push_bytes(chunk);
    }
    assert_eq!(decoder.next_frame(), Some(information_frame()));
    assert!(decoder.buffered().is_empty());
    assert_eq!(decoder.statistics().octets_discarded, 5);
}

#[test]
fn client_link_exchange() {
    let config = LinkConfig {
        server_lower_address: Some(0x11),
        ..LinkConfig::default()
    };

    let snrm = config.snrm_frame().unwrap();
    assert_eq!(snrm.control(), Control::SNRM);
    assert!(snrm.information_field().is_empty());

    let request = config.information_frame(0, 0, &[0x60, 0x1D]).unwrap();
    assert_eq!(
        request.encode(),
        vec![
            0x7E, 0xA0, 0x0F, 0x02, 0x23, 0x21, 0x10, 0xF2, 0xE2, 0xE6, 0xE6, 0x00, 0x60, 0x1D,
            0x2F, 0xCD, 0x7E
        ]
    );
    let pdu = LlcPdu::parse(request.information_field()).unwrap();
    assert_eq!(pdu, LlcPdu::request(vec![0x60, 0x1D]));
}
