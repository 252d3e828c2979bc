// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


//! Check parsing of saved fragments of El País results pages.

use elections::datasource_description::{ElectionResultsSource, ResultsLoader};
use elections::download::CacheDir;
use elections::municipality::{FieldValue, MunicipalityLink};
use elections::normalize::normalize_municipality;
use elpais::parse_elpais::{get_elpais_loader_2019, get_elpais_loader_2021, parse_municipality_index, parse_municipality_page, ElPaisDataSource, MADRID_MUNICIPALITIES};

const INDEX : &str = r#"<html><body>
<ul class="estirar"><li><a href="../../generales/">Generales</a></li></ul>
<ul class="estirar">
  <li><a href="28/02.html">Ajalvir</a></li>
  <li><a href="28/003.html">Alameda del
      Valle</a></li>
  <li><a href="28/005.html">Alcalá de Henares</a></li>
  <li><a>Sin enlace</a></li>
</ul>
</body></html>"#;

const PAGE : &str = r#"<html><body>
<table id="tablaResumen">
  <tr><th class="encabezado">Escrutado:</th><td class="tipoNumero"></td><td class="tipoPorciento">100,00 %</td></tr>
  <tr><th class="encabezado">Votos contabilizados:</th><td class="tipoNumero">118.041</td><td class="tipoPorciento">71,59 %</td></tr>
  <tr><th class="encabezado">Abstenciones:</th><td class="tipoNumero">46.838</td><td class="tipoPorciento">28,41 %</td></tr>
  <tr><th class="encabezado">Votos nulos:</th><td class="tipoNumero">641</td><td class="tipoPorciento">0,54 %</td></tr>
  <tr><th class="encabezado">Votos en blanco:</th><td class="tipoNumero">877</td><td class="tipoPorciento">0,75 %</td></tr>
</table>
<table id="tablaVotosPartidos">
  <tr><th>Partido</th><th>Votos</th><th>%</th></tr>
  <tr><th class="nombrePartido">PP</th><td class="tipoNumeroVotos">51.345</td><td class="tipoPorcientoVotos">43,76 %</td></tr>
  <tr><th class="nombrePartido">Más Madrid</th><td class="tipoNumeroVotos">20.510</td><td class="tipoPorcientoVotos">17,48 %</td></tr>
  <tr><th class="nombrePartido">Podemos-IU</th><td class="tipoNumeroVotos">n/d</td><td class="tipoPorcientoVotos">8,12 %</td></tr>
</table>
</body></html>"#;

#[test]
fn test_parse_index() {
    let links = parse_municipality_index(INDEX,"https://resultados.elpais.com/elecciones/2021/autonomicas/12/").unwrap();
    assert_eq!(links,vec![
        MunicipalityLink::new("Ajalvir","https://resultados.elpais.com/elecciones/2021/autonomicas/12/28/02.html"),
        MunicipalityLink::new("Alameda del Valle","https://resultados.elpais.com/elecciones/2021/autonomicas/12/28/003.html"),
        MunicipalityLink::new("Alcalá de Henares","https://resultados.elpais.com/elecciones/2021/autonomicas/12/28/005.html"),
    ]);
}

#[test]
fn test_index_without_municipality_list() {
    let html = r#"<ul class="estirar"><li><a href="x.html">X</a></li></ul>"#;
    assert!(parse_municipality_index(html,"https://resultados.elpais.com/elecciones/2021/autonomicas/12/").is_err());
}

#[test]
fn test_parse_page() {
    let link = MunicipalityLink::new("Alcalá de Henares","https://resultados.elpais.com/elecciones/2021/autonomicas/12/28/005.html");
    let tables = parse_municipality_page(PAGE,&link);
    assert_eq!(tables.summary.len(),5);
    assert_eq!(tables.summary[1].header.as_deref(),Some("Votos contabilizados:"));
    assert_eq!(tables.summary[1].number.as_deref(),Some("118.041"));
    assert_eq!(tables.summary[0].number.as_deref(),Some(""));
    // header row of the party table has none of the cells.
    assert_eq!(tables.parties.len(),4);
    assert_eq!(tables.parties[0].party,None);
    assert_eq!(tables.parties[2].party.as_deref(),Some("Más Madrid"));

    let normalized = normalize_municipality(&tables);
    assert_eq!(normalized.parties.len(),3);
    let mas_madrid = &normalized.parties[1];
    assert_eq!(mas_madrid.get("mas_madrid"),Some(FieldValue::Count(20510)));
    assert_eq!(mas_madrid.get("mas_madrid_percentage"),Some(FieldValue::Percentage(17.48)));
    let podemos = &normalized.parties[2];
    assert_eq!(podemos.get("podemos_iu"),None);
    assert_eq!(podemos.get("podemos_iu_percentage"),Some(FieldValue::Percentage(8.12)));
    let total = normalized.summary.iter().find_map(|r|r.get("total_votes"));
    assert_eq!(total,Some(FieldValue::Count(118041)));
}

#[test]
fn test_page_without_tables() {
    let link = MunicipalityLink::new("La Acebeda","https://resultados.elpais.com/elecciones/2019/autonomicas/12/28/01.html");
    let tables = parse_municipality_page("<html><body><p>No disponible</p></body></html>",&link);
    assert!(tables.summary.is_empty());
    assert!(tables.parties.is_empty());
    assert_eq!(tables.link,link);
}

#[test]
fn test_loader_configuration() {
    let cache = CacheDir::new(std::env::temp_dir().join("municipal_votes_elpais_test")).unwrap();
    let source = ElPaisDataSource{};
    assert_eq!(source.years(),vec!["2019".to_string(),"2021".to_string()]);
    let loader = source.get_loader_for_year("2019",&cache).unwrap();
    assert_eq!(loader.index_url(),"https://resultados.elpais.com/elecciones/2019/autonomicas/12/");
    assert_eq!(loader.expected_municipalities(),MADRID_MUNICIPALITIES);
    assert_eq!(loader.manual_overrides(),vec![MunicipalityLink::new("La Acebeda","https://resultados.elpais.com/elecciones/2019/autonomicas/12/28/01.html")]);
    assert!(source.get_loader_for_year("2021",&cache).unwrap().manual_overrides().is_empty());
    assert!(source.get_loader_for_year("2015",&cache).is_err());
}

#[test]
fn test_year_loaders() {
    let cache = CacheDir::new(std::env::temp_dir().join("municipal_votes_elpais_test")).unwrap();
    let loader = get_elpais_loader_2019(&cache).unwrap();
    assert_eq!(loader.year(),"2019");
    assert_eq!(loader.index_url(),"https://resultados.elpais.com/elecciones/2019/autonomicas/12/");
    assert_eq!(loader.manual_overrides().len(),1);
    let loader = get_elpais_loader_2021(&cache).unwrap();
    assert_eq!(loader.year(),"2021");
    assert_eq!(loader.index_url(),"https://resultados.elpais.com/elecciones/2021/autonomicas/12/");
    assert_eq!(loader.expected_municipalities(),179);
    assert!(loader.manual_overrides().is_empty());
}
