use std::hint::black_box;

use bencher::{payload_fixtures, request_fixtures};
use bytes::{Bytes, BytesMut};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fileserve::encoding::{DEFAULT_MAX_PAYLOAD, Encoding, compress};
use fileserve_http::codec::{RequestDecoder, ResponseEncoder};
use fileserve_http::protocol::{Message, PayloadItem, PayloadSize, ResponseHead};
use http::{Response, StatusCode};
use tokio_util::codec::{Decoder, Encoder};

/// Read size used when serving files
const CHUNK_SIZE: usize = 8 * 1024;

fn benchmark_request_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("request_decoder");

    for fixture in request_fixtures() {
        group.throughput(Throughput::Bytes(fixture.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fixture.name()), &fixture, |b, fixture| {
            let mut request_decoder = RequestDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(fixture.content()),
                |bytes_mut| {
                    let request = request_decoder.decode(bytes_mut).expect("input should be a valid request line").unwrap();
                    black_box(request);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn chunked_response(payload: &Bytes, dst: &mut BytesMut) {
    let mut encoder = ResponseEncoder::new();
    let head: ResponseHead = Response::builder().status(StatusCode::OK).body(()).expect("static response head");

    encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Chunked)), dst).expect("header should encode");
    let mut offset = 0;
    while offset < payload.len() {
        let end = (offset + CHUNK_SIZE).min(payload.len());
        encoder.encode(Message::<(ResponseHead, PayloadSize)>::Payload(PayloadItem::Chunk(payload.slice(offset..end))), dst).expect("chunk should encode");
        offset = end;
    }
    encoder.encode(Message::<(ResponseHead, PayloadSize)>::Payload(PayloadItem::<Bytes>::Eof), dst).expect("eof should encode");
}

fn benchmark_response_encoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("chunked_response");

    for fixture in payload_fixtures() {
        let payload = Bytes::copy_from_slice(fixture.content());
        group.throughput(Throughput::Bytes(fixture.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fixture.name()), &payload, |b, payload| {
            b.iter_batched_ref(
                || BytesMut::with_capacity(payload.len() + 1024),
                |dst| chunked_response(payload, dst),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_compress(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("compress");

    for fixture in payload_fixtures() {
        group.throughput(Throughput::Bytes(fixture.len() as u64));
        for encoding in [Encoding::Deflate, Encoding::Gzip, Encoding::Zstd, Encoding::Br] {
            group.bench_with_input(BenchmarkId::new(encoding.name(), fixture.name()), &fixture, |b, fixture| {
                b.iter(|| black_box(compress(fixture.content(), encoding, DEFAULT_MAX_PAYLOAD).expect("fixture fits the bound")));
            });
        }
    }

    group.finish();
}

criterion_group!(codec, benchmark_request_decoder, benchmark_response_encoder, benchmark_compress);
criterion_main!(codec);
