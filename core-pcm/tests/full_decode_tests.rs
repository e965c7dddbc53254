mod support;

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::decoder::{DecoderEngine, EngineLoader, EngineSource, EngineTransport};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bytes::Bytes;
use core_pcm::engine::EngineCache;
use core_pcm::full::FullDecoder;
use core_pcm::{find_candidate, PcmError};
use core_runtime::config::ExplorerSettings;
use mockall::{mock, Sequence};

use support::{has_arg, sine_s16le, FakeEngine, Reply, StaticLoader};

mock! {
    Loader {}

    #[async_trait]
    impl EngineLoader for Loader {
        async fn initialize(
            &self,
            source: &EngineSource,
            transport: EngineTransport,
        ) -> BridgeResult<Arc<dyn DecoderEngine>>;
        fn default_sources(&self) -> Vec<EngineSource>;
    }
}

fn settings() -> ExplorerSettings {
    ExplorerSettings::default().with_assumed_sample_rate(8000)
}

fn decoder_with(engine: Arc<FakeEngine>) -> FullDecoder {
    let loader = Arc::new(StaticLoader { engine });
    let cache = EngineCache::new(Some(loader), vec![EngineSource::new("fake")]);
    FullDecoder::new(Arc::new(cache))
}

fn engine_handle(engine: FakeEngine) -> Arc<dyn DecoderEngine> {
    Arc::new(engine)
}

#[tokio::test]
async fn test_linear_candidate_never_touches_engine() {
    let mut loader = MockLoader::new();
    loader.expect_initialize().times(0);

    let cache = EngineCache::new(Some(Arc::new(loader)), vec![EngineSource::new("unused")]);
    let decoder = FullDecoder::new(Arc::new(cache));

    let input = Bytes::from(sine_s16le(12_000, 8000, 220.0));
    let candidate = find_candidate("s16le-1ch").unwrap();
    let buffer = decoder.decode_full(&input, &candidate, &settings()).await.unwrap();
    assert_eq!(buffer.frames(), 12_000);
}

#[tokio::test]
async fn test_first_successful_variant_wins() {
    let pcm = Bytes::from(sine_s16le(800, 8000, 440.0));
    let reply = pcm.clone();
    let engine = Arc::new(FakeEngine::new(move |argv| {
        if has_arg(argv, "-f", "g726le") {
            Reply::Fail("g726le rejected")
        } else {
            Reply::Pcm(reply.clone())
        }
    }));
    let decoder = decoder_with(engine.clone());

    let candidate = find_candidate("g726-adpcm-1ch").unwrap();
    let buffer = decoder
        .decode_full(&Bytes::from_static(&[0x5A; 400]), &candidate, &settings())
        .await
        .unwrap();
    assert_eq!(buffer.frames(), 800);
    assert_eq!(buffer.channel_count(), 1);

    let calls = engine.calls();
    assert_eq!(calls.len(), 2);
    assert!(has_arg(&calls[0], "-f", "g726le"));
    assert!(has_arg(&calls[1], "-f", "g726"));
    for argv in &calls {
        assert!(has_arg(argv, "-ar", "8000"));
        assert!(has_arg(argv, "-ac", "1"));
    }
    assert_eq!(engine.stored_files(), 0);
}

#[tokio::test]
async fn test_all_variants_failing_reports_every_attempt() {
    let engine = Arc::new(FakeEngine::new(|argv| {
        if has_arg(argv, "-f", "g726") {
            Reply::Empty
        } else {
            Reply::Fail("invalid data")
        }
    }));
    let decoder = decoder_with(engine.clone());

    let candidate = find_candidate("g726-adpcm-1ch").unwrap();
    let err = decoder
        .decode_full(&Bytes::from_static(&[1; 64]), &candidate, &settings())
        .await
        .unwrap_err();

    match &err {
        PcmError::ExternalDecodeFailed {
            candidate,
            attempts,
            log,
        } => {
            assert_eq!(candidate, "g726-adpcm-1ch");
            assert_eq!(attempts.len(), 3);
            assert!(attempts[1].contains("empty output"));
            assert_eq!(log.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("error: invalid data"));
    assert_eq!(engine.stored_files(), 0);
}

#[tokio::test]
async fn test_concurrent_decodes_use_distinct_file_names() {
    let engine = Arc::new(FakeEngine::always(Bytes::from(sine_s16le(100, 8000, 440.0))));
    let decoder = decoder_with(engine.clone());
    let candidate = find_candidate("oki-adpcm-1ch").unwrap();
    let input = Bytes::from_static(&[0x77; 50]);
    let settings = settings();

    let (a, b) = tokio::join!(
        decoder.decode_full(&input, &candidate, &settings),
        decoder.decode_full(&input, &candidate, &settings)
    );
    assert_eq!(a.unwrap().frames(), 100);
    assert_eq!(b.unwrap().frames(), 100);

    let names = engine.written_names();
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
    assert!(names.iter().all(|n| n.ends_with(".vox")));
}

#[tokio::test]
async fn test_engine_init_tries_transports_then_sources_in_order() {
    let mut seq = Sequence::new();
    let mut loader = MockLoader::new();
    loader
        .expect_initialize()
        .withf(|source, transport| {
            source.location == "primary" && *transport == EngineTransport::WithWorker
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(BridgeError::NotAvailable("no worker".into())));
    loader
        .expect_initialize()
        .withf(|source, transport| {
            source.location == "primary" && *transport == EngineTransport::Inline
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(BridgeError::OperationFailed("bad binary".into())));
    loader
        .expect_initialize()
        .withf(|source, transport| {
            source.location == "fallback" && *transport == EngineTransport::WithWorker
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(engine_handle(FakeEngine::always(Bytes::from_static(&[0, 0])))));

    let cache = EngineCache::new(
        Some(Arc::new(loader)),
        vec![EngineSource::new("primary"), EngineSource::new("fallback")],
    );

    let first = cache.acquire().await.unwrap();
    let second = cache.acquire().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(cache.is_ready().await);
}

#[tokio::test]
async fn test_failed_init_is_retried_on_next_call() {
    let mut seq = Sequence::new();
    let mut loader = MockLoader::new();
    loader
        .expect_initialize()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(BridgeError::NotAvailable("missing".into())));
    loader
        .expect_initialize()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(engine_handle(FakeEngine::always(Bytes::from_static(&[1, 0])))));

    let cache = EngineCache::new(Some(Arc::new(loader)), vec![EngineSource::new("only")]);

    let err = cache.acquire().await.err().unwrap();
    match &err {
        PcmError::InitError { attempts } => assert_eq!(attempts.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
    assert!(!cache.is_ready().await);

    assert!(cache.acquire().await.is_ok());
    assert!(cache.is_ready().await);
}

#[tokio::test]
async fn test_missing_loader_is_capability_error() {
    let cache = EngineCache::new(None, Vec::new());
    let decoder = FullDecoder::new(Arc::new(cache));
    let candidate = find_candidate("oki-adpcm-1ch").unwrap();

    let err = decoder
        .decode_full(&Bytes::from_static(&[0; 8]), &candidate, &settings())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PcmError::Runtime(core_runtime::Error::CapabilityMissing { .. })
    ));
}

#[tokio::test]
async fn test_export_candidate_wraps_full_decode() {
    let decoder = decoder_with(Arc::new(FakeEngine::always(Bytes::new())));
    let candidate = find_candidate("s16le-2ch").unwrap();
    let input = Bytes::from_static(&[0x00, 0x40, 0x00, 0xC0, 0x01, 0x00, 0xFF, 0xFF]);

    let wav = decoder
        .export_candidate(&input, &candidate, &settings().with_playback_sample_rate(11025))
        .await
        .unwrap();
    assert_eq!(wav.len(), 44 + input.len());
    assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 11025);
    assert_eq!(&wav[44..], &input[..]);
}

struct NeverEngine;

#[async_trait]
impl DecoderEngine for NeverEngine {
    async fn write_input(&self, _name: &str, _data: Bytes) -> BridgeResult<()> {
        Err(BridgeError::OperationFailed("read-only".into()))
    }

    async fn execute(&self, _argv: &[String]) -> BridgeResult<()> {
        Ok(())
    }

    async fn read_output(&self, _name: &str) -> BridgeResult<Bytes> {
        Ok(Bytes::new())
    }

    fn describe(&self) -> String {
        "never".into()
    }
}

#[tokio::test]
async fn test_input_write_failure_propagates_as_bridge_error() {
    let mut loader = MockLoader::new();
    loader
        .expect_initialize()
        .returning(|_, _| Ok(Arc::new(NeverEngine) as Arc<dyn DecoderEngine>));
    let cache = EngineCache::new(Some(Arc::new(loader)), vec![EngineSource::new("x")]);
    let decoder = FullDecoder::new(Arc::new(cache));
    let candidate = find_candidate("oki-adpcm-1ch").unwrap();

    let err = decoder
        .decode_full(&Bytes::from_static(&[0; 8]), &candidate, &settings())
        .await
        .unwrap_err();
    assert!(matches!(err, PcmError::Bridge(BridgeError::OperationFailed(_))));
}
