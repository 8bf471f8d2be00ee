//! End-to-end lookups through the public API.

use rescache::{
    AnswerRecord, CachingResolver, Error, HandleFactory, QueryExecutor,
    QueryResult, RecordData, ResolvConf, ResolverConfig, Rtype,
};
use std::collections::HashMap;
use std::future::Future;
use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

//------------ Scripted transport --------------------------------------------

#[derive(Default)]
struct Zone {
    answers: Mutex<HashMap<(String, Rtype), QueryResult>>,
    queries: Mutex<usize>,
}

impl Zone {
    fn answer(&self, name: &str, rtype: Rtype, records: Vec<AnswerRecord>) {
        self.answers
            .lock()
            .unwrap()
            .insert((name.into(), rtype), Ok(records));
    }

    fn query_count(&self) -> usize {
        *self.queries.lock().unwrap()
    }
}

struct ZoneHandle {
    zone: Arc<Zone>,
}

impl QueryExecutor for ZoneHandle {
    fn query<'a>(
        &'a mut self,
        name: &'a str,
        rtype: Rtype,
    ) -> Pin<Box<dyn Future<Output = QueryResult> + Send + 'a>> {
        *self.zone.queries.lock().unwrap() += 1;
        let res = self
            .zone
            .answers
            .lock()
            .unwrap()
            .get(&(name.to_string(), rtype))
            .cloned()
            .unwrap_or(Ok(Vec::new()));
        Box::pin(async move { res })
    }
}

struct ZoneFactory {
    zone: Arc<Zone>,
}

impl HandleFactory for ZoneFactory {
    type Handle = ZoneHandle;

    fn create(&self, _conf: &ResolvConf) -> ZoneHandle {
        ZoneHandle {
            zone: self.zone.clone(),
        }
    }
}

fn resolver(zone: Arc<Zone>) -> CachingResolver<ZoneFactory> {
    let config = ResolverConfig {
        nameservers: vec!["192.0.2.53".into()],
        hosts_path: PathBuf::from("/nonexistent/hosts"),
        conf_path: PathBuf::from("/nonexistent/resolv.conf"),
        ..Default::default()
    };
    CachingResolver::from_conf(config, ZoneFactory { zone })
}

//------------ Tests ---------------------------------------------------------

#[tokio::test]
async fn lookup_follows_aliases_and_caches() {
    let zone = Arc::new(Zone::default());
    zone.answer(
        "www.example.com",
        Rtype::Cname,
        vec![AnswerRecord::cname("www.example.com", 300, "example.com")],
    );
    zone.answer(
        "example.com",
        Rtype::A,
        vec![AnswerRecord::a("example.com", 300, [192, 0, 2, 80].into())],
    );

    let resolver = resolver(zone.clone());
    let records = resolver
        .resolve_type("www.example.com", Rtype::A)
        .await
        .unwrap();
    assert_eq!(
        records[0].data(),
        &RecordData::A([192, 0, 2, 80].into())
    );

    // Repeating the lookup, in any spelling, stays within the cache.
    let queries = zone.query_count();
    resolver
        .resolve_type("WWW.Example.Com", Rtype::A)
        .await
        .unwrap();
    assert_eq!(zone.query_count(), queries);
}

#[tokio::test]
async fn fallback_remembers_the_winning_type() {
    let zone = Arc::new(Zone::default());
    zone.answer(
        "v6only.example",
        Rtype::Aaaa,
        vec![AnswerRecord::aaaa(
            "v6only.example",
            300,
            Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1),
        )],
    );

    let resolver = resolver(zone);
    let records = resolver.resolve("v6only.example").await.unwrap();
    assert!(matches!(records[0].data(), RecordData::Aaaa(_)));
    assert_eq!(records[0].rtype(), Rtype::Aaaa);

    let records = resolver.resolve("v6only.example").await.unwrap();
    assert_eq!(records[0].rtype(), Rtype::Aaaa);
}

#[tokio::test]
async fn missing_names_report_no_answer() {
    let zone = Arc::new(Zone::default());
    let resolver = resolver(zone);
    let err = resolver.resolve("nowhere.example").await.unwrap_err();
    assert!(matches!(err, Error::NoAnswer));
}
