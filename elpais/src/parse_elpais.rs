// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


use std::borrow::Cow;
use anyhow::{anyhow, Context};
use elections::datasource_description::{ElectionResultsSource, ResultsLoader};
use elections::download::CacheDir;
use elections::municipality::{MunicipalityLink, RawMunicipalityTables, RawPartyRow, RawSummaryRow};
use elections::parse_util::merge_whitespace_to_space;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// The number of municipalities in the Comunidad de Madrid.
pub const MADRID_MUNICIPALITIES : usize = 179;

/// The page linking to every municipality's results for a given year.
pub fn index_url(year:&str) -> String {
    format!("https://resultados.elpais.com/elecciones/{}/autonomicas/12/",year)
}

pub fn get_elpais_loader_2019(cache:&CacheDir) -> anyhow::Result<ElPaisDataLoader> {
    ElPaisDataLoader::new(cache, "2019")
}

pub fn get_elpais_loader_2021(cache:&CacheDir) -> anyhow::Result<ElPaisDataLoader> {
    ElPaisDataLoader::new(cache, "2021")
}

pub struct ElPaisDataSource {}

impl ElectionResultsSource for ElPaisDataSource {
    fn name(&self) -> Cow<'static, str> { "Comunidad de Madrid regional".into() }
    fn publisher_name(&self) -> Cow<'static, str> { "El País".into() }
    fn publisher_url(&self) -> Cow<'static, str> { "https://resultados.elpais.com/".into() }
    fn years(&self) -> Vec<String> { vec!["2019".to_string(),"2021".to_string()] }
    fn get_loader_for_year(&self,year: &str,cache:&CacheDir) -> anyhow::Result<Box<dyn ResultsLoader>> {
        Ok(Box::new(ElPaisDataLoader::new(cache,year)?))
    }
}

pub struct ElPaisDataLoader {
    year : String,
    cache : CacheDir,
}

impl ElPaisDataLoader {
    pub fn new(cache:&CacheDir,year:&str) -> anyhow::Result<Self> {
        if !(ElPaisDataSource{}).years().iter().any(|y|y==year) { return Err(anyhow!("No El País results known for {}",year)); }
        Ok(ElPaisDataLoader{ year: year.to_string(), cache: cache.clone() })
    }
}

impl ResultsLoader for ElPaisDataLoader {
    fn year(&self) -> String { self.year.clone() }
    fn index_url(&self) -> String { index_url(&self.year) }
    fn expected_municipalities(&self) -> usize { MADRID_MUNICIPALITIES }

    /// The 2019 index page omits La Acebeda, although its results page exists.
    fn manual_overrides(&self) -> Vec<MunicipalityLink> {
        match self.year.as_str() {
            "2019" => vec![MunicipalityLink::new("La Acebeda","https://resultados.elpais.com/elecciones/2019/autonomicas/12/28/01.html")],
            _ => vec![],
        }
    }

    fn read_municipality_links(&self) -> anyhow::Result<Vec<MunicipalityLink>> {
        let url = self.index_url();
        let html = self.cache.get_or_download_string(&url)?;
        parse_municipality_index(&html,&url).with_context(||format!("Could not parse index page {}",url))
    }

    fn read_municipality_tables(&self,link:&MunicipalityLink) -> anyhow::Result<RawMunicipalityTables> {
        let html = self.cache.get_or_download_string(&link.detail_url)?;
        Ok(parse_municipality_page(&html,link))
    }
}

/// Get all the text in an element as a string
fn text_content(e:&ElementRef<'_>) -> String {
    e.text().collect::<Vec<_>>().join("")
}

/// Parse the index page for a year. The municipality links are the anchors in the list items
/// of the second `ul.estirar` on the page; the first is the list of regions.
/// ```html
/// <ul class="estirar"><li><a href="28/01.html">La Acebeda</a></li><li><a href="28/02.html">Ajalvir</a></li>...</ul>
/// ```
pub fn parse_municipality_index(html:&str,base_url:&str) -> anyhow::Result<Vec<MunicipalityLink>> {
    let base = Url::parse(base_url)?;
    let document = Html::parse_document(html);
    let lists : Vec<ElementRef> = document.select(&Selector::parse("ul.estirar").unwrap()).collect();
    let list = lists.get(1).ok_or_else(||anyhow!("Expected at least 2 lists of class estirar, found {}",lists.len()))?;
    let mut res = vec![];
    for a in list.select(&Selector::parse("li a").unwrap()) {
        let name = merge_whitespace_to_space(&text_content(&a));
        let Some(href) = a.value().attr("href") else {
            warn!(municipality=%name,"index entry without a link");
            continue;
        };
        if name.is_empty() {
            warn!(href,"index link without a municipality name");
            continue;
        }
        let url = base.join(href)?;
        res.push(MunicipalityLink::new(&name,url.as_str()));
    }
    debug!(links=res.len(),"parsed index");
    Ok(res)
}

/// The text of the first element matching `selector` inside `row`, if any.
fn cell(row:&ElementRef<'_>,selector:&Selector) -> Option<String> {
    row.select(selector).next().map(|e|text_content(&e))
}

/// The `tr` elements of the table with the given id, or none (with a warning) if there is no such table.
fn table_rows<'a>(document:&'a Html,table_id:&str,link:&MunicipalityLink) -> Vec<ElementRef<'a>> {
    let table_selector = Selector::parse(&format!("table#{}",table_id)).unwrap();
    match document.select(&table_selector).next() {
        Some(table) => table.select(&Selector::parse("tr").unwrap()).collect(),
        None => {
            warn!(municipality=%link.name,url=%link.detail_url,table=table_id,"table missing from page");
            vec![]
        }
    }
}

/// Parse one municipality's results page, extracting the text of the summary table `tablaResumen`
/// and the party table `tablaVotosPartidos`. Cells are not interpreted at all here.
/// ```html
/// <table id="tablaResumen">
///   <tr><th class="encabezado">Votos nulos:</th><td class="tipoNumero">1.234</td><td class="tipoPorciento">0,85 %</td></tr>
/// </table>
/// <table id="tablaVotosPartidos">
///   <tr><th class="nombrePartido">Más Madrid</th><td class="tipoNumeroVotos">12.345</td><td class="tipoPorcientoVotos">17,02 %</td></tr>
/// </table>
/// ```
pub fn parse_municipality_page(html:&str,link:&MunicipalityLink) -> RawMunicipalityTables {
    let document = Html::parse_document(html);
    let header = Selector::parse(".encabezado").unwrap();
    let number = Selector::parse(".tipoNumero").unwrap();
    let percentage = Selector::parse(".tipoPorciento").unwrap();
    let summary = table_rows(&document,"tablaResumen",link).iter().map(|tr|RawSummaryRow{
        header: cell(tr,&header),
        number: cell(tr,&number),
        percentage: cell(tr,&percentage),
    }).collect();
    let party = Selector::parse(".nombrePartido").unwrap();
    let votes = Selector::parse(".tipoNumeroVotos").unwrap();
    let party_percentage = Selector::parse(".tipoPorcientoVotos").unwrap();
    let parties = table_rows(&document,"tablaVotosPartidos",link).iter().map(|tr|RawPartyRow{
        party: cell(tr,&party),
        votes: cell(tr,&votes),
        percentage: cell(tr,&party_percentage),
    }).collect();
    RawMunicipalityTables{ link: link.clone(), summary, parties }
}
