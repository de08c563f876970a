use criterion::{black_box, criterion_group, criterion_main, Criterion};
use katana::http::{Method, Parser};
use katana::router::{RouteEntry, Router};
use katana::Arena;

fn sample_router() -> Router {
    Router::new(vec![
        RouteEntry::new(Method::Get, "/", "root"),
        RouteEntry::new(Method::Get, "/zoo/animals", "get_animals"),
        RouteEntry::new(Method::Post, "/zoo/animals", "create_animal"),
        RouteEntry::new(Method::Get, "/zoo/animals/{id}", "get_animal"),
        RouteEntry::new(Method::Put, "/zoo/animals/{id}", "update_animal"),
        RouteEntry::new(Method::Delete, "/zoo/animals/{id}", "delete_animal"),
        RouteEntry::new(Method::Get, "/zoo/animals/{id}/toys/{toy_id}", "animal_toy"),
        RouteEntry::new(
            Method::Get,
            "/zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}",
            "habitat_section",
        ),
        RouteEntry::new(
            Method::Post,
            "/inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}",
            "post_item_batch",
        ),
        RouteEntry::new(Method::Get, "/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}", "complex_many_params"),
    ])
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = sample_router();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::Get, "/zoo/animals/123"),
            (Method::Get, "/zoo/animals/123/toys/456"),
            (Method::Get, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::Post, "/inventory/1/feeds/2/items/3/batches/4"),
            (Method::Get, "/complex/1/2/3/4/5/6/7/8/9"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = router.route(*method, path);
                black_box(&res);
            }
        })
    });
}

fn bench_parse_and_materialize(c: &mut Criterion) {
    let request = b"POST /zoo/animals HTTP/1.1\r\nHost: x\r\nContent-Type: application/json\r\nContent-Length: 24\r\n\r\n{\"name\":\"Otter\",\"age\":3}";
    c.bench_function("parse_and_materialize_request", |b| {
        b.iter(|| {
            let arena = Arena::default();
            let mut parser = Parser::new();
            parser.parse(black_box(&request[..])).expect("request parses");
            let req = parser.request(&arena);
            black_box(&req);
        })
    });
}

criterion_group!(benches, bench_route_throughput, bench_parse_and_materialize);
criterion_main!(benches);
