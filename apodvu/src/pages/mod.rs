use actix_web::{web, Resource};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use apod::{Clock, SystemClock};

use crate::icons::Icon;

pub mod details;
pub mod gallery;
pub mod hero;
pub mod search;
pub mod status;
pub mod templates;

/// Today's date as the service counts days.
pub fn today() -> NaiveDate
{
    SystemClock.now().naive_utc().date()
}

pub struct HeaderLink
{
    pub path: String,
    pub label: String,
    pub icon: Icon,
}

pub struct HeaderLinkCollection
{
    by_order: BTreeMap<(isize, String), (String, Icon)>,
}

impl HeaderLinkCollection
{
    pub fn new() -> Self
    {
        HeaderLinkCollection
        {
            by_order: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, path: String, label: String, icon: Icon, order: isize)
    {
        self.by_order.insert((order, path), (label, icon));
    }

    pub fn by_order(&self) -> Vec<HeaderLink>
    {
        self.by_order
            .iter()
            .map(|(k, v)| { HeaderLink { path: k.1.clone(), label: v.0.clone(), icon: v.1 }})
            .collect()
    }
}

pub trait PageResources
{
    fn page_resources(builder: &mut PageResourcesBuilder);
}

pub struct PageResourcesBuilder
{
    pub header_links: HeaderLinkCollection,
    pub view_resources: Vec<Resource>,
    pub other_resources: Vec<Resource>,
}

impl PageResourcesBuilder
{
    pub fn new() -> Self
    {
        PageResourcesBuilder
        {
            header_links: HeaderLinkCollection::new(),
            view_resources: Vec::new(),
            other_resources: Vec::new(),
        }
    }

    pub fn add_header_link(&mut self, path: &str, label: &str, icon: Icon, order: isize) -> &mut Self
    {
        self.header_links.insert(path.to_owned(), label.to_owned(), icon, order);
        self
    }

    pub fn route_view(&mut self, path: &str, route: actix_web::Route) -> &mut Self
    {
        self.view_resources.push(web::resource(path).route(route));
        self
    }

    pub fn route_other(&mut self, path: &str, route: actix_web::Route) -> &mut Self
    {
        self.other_resources.push(web::resource(path).route(route));
        self
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_header_links_sorted_by_order()
    {
        let mut links = HeaderLinkCollection::new();
        links.insert("/gallery".to_owned(), "Gallery".to_owned(), Icon::Images, 200);
        links.insert("/".to_owned(), "Today".to_owned(), Icon::Telescope, 100);

        let labels = links.by_order().into_iter().map(|l| l.label).collect::<Vec<_>>();

        assert_eq!(labels, vec!["Today", "Gallery"]);
    }
}
