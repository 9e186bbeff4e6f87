#![cfg(feature = "macros")]

use emissary::prelude::*;
use emissary::testing::StaticHandler;

#[derive(Request)]
#[request(response = Vec<u32>)]
struct ListIds {
    #[allow(dead_code)]
    limit: usize,
}

#[derive(Request)]
struct Shutdown;

#[derive(Request)]
#[request(response = Option<T>)]
struct Lookup<T: Clone + Send + Sync + 'static> {
    key: T,
}

struct LookupHandler;

impl Handler<Lookup<String>> for LookupHandler {
    async fn handle(
        &self,
        req: &Lookup<String>,
        _: &CancellationToken,
    ) -> HandlerOutput<Option<String>> {
        Ok(Some((!req.key.is_empty()).then(|| req.key.clone())))
    }
}

fn assert_response<R: Request<Response = T>, T>() {}

#[test]
fn test_derive_sets_response_type() {
    assert_response::<ListIds, Vec<u32>>();
    assert_response::<Shutdown, ()>();
    assert_response::<Lookup<u8>, Option<u8>>();
}

#[tokio::test]
async fn test_derived_requests_dispatch() {
    let registry = RegistryBuilder::new()
        .register_handler::<ListIds>(StaticHandler::new(vec![1_u32, 2, 3]))
        .register_handler::<Shutdown>(StaticHandler::new(()))
        .register_handler::<Lookup<String>>(LookupHandler)
        .build();
    let mediator = Mediator::new(registry);

    let ids = mediator
        .send(ListIds { limit: 3 }, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids, [1, 2, 3]);

    mediator
        .send(Shutdown, CancellationToken::new())
        .await
        .unwrap();

    let found = mediator
        .send(
            Lookup {
                key: "k".to_string(),
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(found.as_deref(), Some("k"));
}
