use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PaginateRes<T: Serialize> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_page: i64,
    pub total_item: i64,
}

impl<T: Serialize> PaginateRes<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total_item: i64) -> Self {
        let total_page = if limit > 0 {
            (total_item + limit - 1) / limit
        } else {
            0
        };

        Self {
            data,
            page,
            limit,
            total_page,
            total_item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_page_rounds_up() {
        let res = PaginateRes::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(res.total_page, 3);
    }

    #[test]
    fn total_page_exact_division() {
        let res = PaginateRes::new(vec![1, 2, 3], 2, 3, 6);
        assert_eq!(res.total_page, 2);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let res: PaginateRes<i32> = PaginateRes::new(Vec::new(), 1, 3, 0);
        assert_eq!(res.total_page, 0);
        assert_eq!(res.total_item, 0);
    }
}
