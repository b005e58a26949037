use super::*;
use rstest::rstest;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 100);
}

#[test]
fn test_page_request_offset() {
    assert_eq!(PageRequest::new(1, 20).offset(), 0);
    assert_eq!(PageRequest::new(2, 20).offset(), 20);
    assert_eq!(PageRequest::new(0, 20).offset(), 0);
}

#[test]
fn test_page_request_limit() {
    assert_eq!(PageRequest::new(1, 50).limit(), 50);
}

#[rstest]
#[case(PageRequest::new(0, 0), 500, PageRequest::new(1, 1))]
#[case(PageRequest::new(3, 10_000), 500, PageRequest::new(3, 500))]
#[case(PageRequest::new(2, 250), 500, PageRequest::new(2, 250))]
fn test_page_request_clamped(
    #[case] request: PageRequest,
    #[case] max: u32,
    #[case] expected: PageRequest,
) {
    assert_eq!(request.clamped(max), expected);
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), 1, 10, 3);

    assert_eq!(response.data, data);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 10);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_pagination() {
    // 25 items, 10 per page -> 3 pages
    let response: PageResponse<i32> = PageResponse::new(vec![], 1, 10, 25);
    assert_eq!(response.meta.total_pages, 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], 1, 10, 0);
    assert_eq!(response.meta.total_pages, 1);
}
